mod common;

use std::path::PathBuf;

use anyhow::Result;
use detnes_core::{Button, Console, ConsoleConfig};
use detnes_support::{
    Activity, HeadlessDriver, PreimageStore, compress_blob, decompress_blob,
    store::{dynamic_digest, static_digest},
};

use common::{LOOP_COUNTER, PAD1_BITS, PAD2_BITS, pad_rom};

const STEPS_PER_TICK: u64 = 500;

fn blobs() -> Result<(Vec<u8>, Vec<u8>)> {
    let mut console = Console::from_rom_bytes(&pad_rom(), ConsoleConfig::default())?;
    console.step_frame();
    Ok((console.serialize_static()?, console.serialize_dynamic()?))
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("detnes-{name}-{}", std::process::id()))
}

#[test]
fn activity_reaches_the_program() -> Result<()> {
    let (static_bytes, dynamic_bytes) = blobs()?;
    let mut driver = HeadlessDriver::from_blobs(&static_bytes, &dynamic_bytes, STEPS_PER_TICK, false)?;

    let mut activity = Activity::new();
    activity.hold(0, &[Button::Start], 0).hold(1, &[Button::Right, Button::A], 4);
    let counter = driver.console().ram()[LOOP_COUNTER];
    driver.run(&activity);

    let ram = driver.console().ram();
    assert_eq!(ram[PAD1_BITS], 0x10);
    assert_eq!(ram[PAD2_BITS], 0x81);
    assert_ne!(ram[LOOP_COUNTER], counter);
    assert_eq!(driver.ticks(), 4);

    driver.run(&"|2|........|........|".parse()?);
    assert_eq!(driver.console().ram()[PAD1_BITS], 0);
    assert_eq!(driver.console().ram()[PAD2_BITS], 0);
    assert_eq!(driver.ticks(), 6);
    Ok(())
}

#[test]
fn tick_cycles_match_the_cpu_counter() -> Result<()> {
    let (static_bytes, dynamic_bytes) = blobs()?;
    let mut driver = HeadlessDriver::from_blobs(&static_bytes, &dynamic_bytes, STEPS_PER_TICK, true)?;
    let start = driver.console().cpu().cycles();
    let cycles = driver.tick(7);
    assert_eq!(driver.console().cpu().cycles() - start, cycles);

    let steps = driver.tick_seconds(1.0);
    assert_eq!(steps, 29_829);
    Ok(())
}

#[test]
fn replay_is_repeatable_from_the_same_blobs() -> Result<()> {
    let (static_bytes, dynamic_bytes) = blobs()?;
    let activity: Activity = "\
# press and release both pads
|3|R..U...A|.L..T...|
|5|........||
|2|...D.S..|B.......|
"
    .parse()?;

    let outcomes = (0..3)
        .map(|_| -> Result<Vec<u8>> {
            let mut driver =
                HeadlessDriver::from_blobs(&static_bytes, &dynamic_bytes, STEPS_PER_TICK, false)?;
            driver.run(&activity);
            Ok(driver.console().serialize_dynamic()?)
        })
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[1], outcomes[2]);
    assert_ne!(outcomes[0], dynamic_bytes);
    Ok(())
}

#[test]
fn preimages_survive_a_directory_round_trip() -> Result<()> {
    let (static_bytes, dynamic_bytes) = blobs()?;
    let mut store = PreimageStore::new();
    let static_key = store.insert_static(static_bytes.clone());
    let dynamic_key = store.insert_dynamic(dynamic_bytes.clone());
    assert_eq!(static_key, static_digest(&static_bytes));
    assert_eq!(dynamic_key, dynamic_digest(&dynamic_bytes));

    let dir = scratch_dir("preimages");
    store.write_dir(&dir)?;
    std::fs::write(dir.join("0000.bin"), b"not a preimage")?;
    let loaded = PreimageStore::read_dir(&dir)?;
    std::fs::remove_dir_all(&dir)?;

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get(&static_key)?, static_bytes.as_slice());
    let console = loaded.reconstruct(&static_key, &dynamic_key, false)?;
    assert_eq!(console.serialize_dynamic()?, dynamic_bytes);
    Ok(())
}

#[test]
fn compressed_static_blob_is_smaller_and_restorable() -> Result<()> {
    let (static_bytes, dynamic_bytes) = blobs()?;
    let packed = compress_blob(&static_bytes);
    assert!(packed.len() < static_bytes.len());

    let restored = decompress_blob(&packed)?;
    let console = Console::new_headless(&restored, &dynamic_bytes, false)?;
    assert_eq!(console.serialize_static()?, static_bytes);
    Ok(())
}
