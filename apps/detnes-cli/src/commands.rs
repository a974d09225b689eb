use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use detnes_core::{Console, ConsoleConfig};
use detnes_support::{
    Activity, HeadlessDriver, PreimageStore,
    store::{digest, dynamic_digest, static_digest},
};
use tracing::info;

/// `run` drains the sample queue at least this often so none are dropped.
const DRAIN_SECONDS: f64 = 0.5;

pub fn encode(
    roms: &[PathBuf],
    preimages: Option<&Path>,
    warmup_frames: u32,
    config: ConsoleConfig,
) -> Result<()> {
    let mut store = PreimageStore::new();
    for rom in roms {
        println!("Encoding ROM: {}", rom.display());
        let mut console = Console::from_rom_file(rom, config)
            .with_context(|| format!("failed to load {}", rom.display()))?;
        for _ in 0..warmup_frames {
            console.step_frame();
        }

        let static_bytes = console.serialize_static()?;
        let dynamic_bytes = console.serialize_dynamic()?;

        let static_path = rom.with_extension("static");
        println!("Static hash: {}", static_digest(&static_bytes));
        println!("Writing static data: {}", static_path.display());
        write(&static_path, &static_bytes)?;

        let dynamic_path = rom.with_extension("dyn");
        println!("Dynamic hash: {}", dynamic_digest(&dynamic_bytes));
        println!("Writing dynamic data: {}", dynamic_path.display());
        write(&dynamic_path, &dynamic_bytes)?;

        store.insert_static(static_bytes);
        store.insert_dynamic(dynamic_bytes);
    }

    if let Some(dir) = preimages {
        store
            .write_dir(dir)
            .with_context(|| format!("failed to write preimages to {}", dir.display()))?;
        info!(count = store.len(), dir = %dir.display(), "preimages written");
    }
    Ok(())
}

pub struct ReplayOptions<'a> {
    pub static_blob: &'a Path,
    pub dynamic_blob: &'a Path,
    pub activity: Option<&'a Path>,
    pub ticks: u64,
    pub steps_per_tick: u64,
    pub out: Option<&'a Path>,
    pub audio: bool,
}

pub fn replay(options: ReplayOptions<'_>) -> Result<()> {
    let static_bytes = read(options.static_blob)?;
    let dynamic_bytes = read(options.dynamic_blob)?;
    let mut driver = HeadlessDriver::from_blobs(
        &static_bytes,
        &dynamic_bytes,
        options.steps_per_tick,
        options.audio,
    )
    .context("failed to rebuild console from blobs")?;

    let mut cycles = 0;
    if let Some(path) = options.activity {
        let activity: Activity = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
            .parse()
            .with_context(|| format!("failed to parse {}", path.display()))?;
        cycles += driver.run(&activity);
    }
    cycles += driver.tick(options.ticks);

    let result = driver.console().serialize_dynamic()?;
    info!(ticks = driver.ticks(), cycles, "replay finished");
    println!("Dynamic hash: {}", dynamic_digest(&result));
    if let Some(out) = options.out {
        println!("Writing dynamic data: {}", out.display());
        write(out, &result)?;
    }
    Ok(())
}

pub fn run(rom: &Path, seconds: f64, config: ConsoleConfig) -> Result<()> {
    let mut console = Console::from_rom_file(rom, config)
        .with_context(|| format!("failed to load {}", rom.display()))?;
    let frame = console.ppu().frame();
    let mut cycles = 0;
    let mut samples = 0;
    let mut remaining = seconds;
    while remaining > 0.0 {
        let chunk = remaining.min(DRAIN_SECONDS);
        cycles += console.step_seconds(chunk);
        samples += console.take_samples().len();
        remaining -= chunk;
    }
    let registers = console.cpu().registers();

    println!("Region: {}", console.region());
    println!("Mapper: {}", console.mapper().id());
    println!("CPU cycles: {cycles}");
    println!("Frames: {}", console.ppu().frame() - frame);
    println!("Registers: {registers:?}");
    println!("Audio samples: {samples}");
    println!("Framebuffer hash: {}", digest(console.buffer()));
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
