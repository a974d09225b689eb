mod common;

use anyhow::Result;
use detnes_core::{Console, ConsoleConfig};
use proptest::prelude::*;

use common::{IRQ_COUNT, NMI_COUNT, observe, run_scripted, stress_rom};

const WARMUP_STEPS: u64 = 100_000;
const CONTINUE_STEPS: u64 = 100_000;

#[test]
fn stress_rom_exercises_every_unit() -> Result<()> {
    let mut console = Console::from_rom_bytes(&stress_rom(), ConsoleConfig::default())?;
    run_scripted(&mut console, 0, WARMUP_STEPS);

    assert!(console.ram()[NMI_COUNT] > 0, "NMI handler never ran");
    assert!(console.ram()[IRQ_COUNT] > 0, "MMC3 IRQ never fired");
    assert!(console.buffer().iter().any(|&px| px != 0), "nothing rendered");
    assert!(console.ppu().oam().iter().any(|&b| b != 0), "OAM DMA never ran");
    assert!(!console.take_samples().is_empty());
    Ok(())
}

/// 100k steps, split into blobs, then 100k more on the original and on a
/// console rebuilt from the blobs alone.
#[test]
fn reconstructed_console_never_diverges() -> Result<()> {
    let mut original = Console::from_rom_bytes(&stress_rom(), ConsoleConfig::default())?;
    run_scripted(&mut original, 0, WARMUP_STEPS);

    let static_bytes = original.serialize_static()?;
    let dynamic_bytes = original.serialize_dynamic()?;
    let mut rebuilt = Console::new_headless(&static_bytes, &dynamic_bytes, true)?;
    assert_eq!(observe(&rebuilt), observe(&original));

    for chunk in 0..10 {
        let start = WARMUP_STEPS + chunk * CONTINUE_STEPS / 10;
        run_scripted(&mut original, start, CONTINUE_STEPS / 10);
        run_scripted(&mut rebuilt, start, CONTINUE_STEPS / 10);
        assert_eq!(observe(&rebuilt), observe(&original), "diverged in chunk {chunk}");
    }
    assert_eq!(rebuilt.serialize_dynamic()?, original.serialize_dynamic()?);
    Ok(())
}

#[test]
fn reconstruction_is_repeatable() -> Result<()> {
    let mut original = Console::from_rom_bytes(&stress_rom(), ConsoleConfig::default())?;
    run_scripted(&mut original, 0, 20_000);
    let static_bytes = original.serialize_static()?;
    let dynamic_bytes = original.serialize_dynamic()?;

    let outcomes = (0..2)
        .map(|_| -> Result<Vec<u8>> {
            let mut console = Console::new_headless(&static_bytes, &dynamic_bytes, false)?;
            run_scripted(&mut console, 20_000, 20_000);
            Ok(console.serialize_dynamic()?)
        })
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(outcomes[0], outcomes[1]);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Any input timeline, any split point: the rebuilt console follows the
    /// original exactly.
    #[test]
    fn split_point_and_inputs_do_not_matter(
        split in 1u64..6_000,
        presses in prop::collection::vec((0u64..12_000, any::<u8>()), 1..8),
    ) {
        let buttons_at = |step: u64| -> [bool; 8] {
            let byte = presses
                .iter()
                .filter(|(at, _)| *at <= step)
                .max_by_key(|(at, _)| *at)
                .map_or(0, |(_, byte)| *byte);
            std::array::from_fn(|bit| byte >> bit & 1 == 1)
        };
        let drive = |console: &mut Console, range: std::ops::Range<u64>| {
            for step in range {
                console.controller1_mut().set_buttons(buttons_at(step));
                console.step();
            }
        };

        let mut original = Console::from_rom_bytes(&stress_rom(), ConsoleConfig::default()).unwrap();
        drive(&mut original, 0..split);
        let mut rebuilt = Console::new_headless(
            &original.serialize_static().unwrap(),
            &original.serialize_dynamic().unwrap(),
            false,
        )
        .unwrap();
        drive(&mut original, split..12_000);
        drive(&mut rebuilt, split..12_000);
        prop_assert_eq!(observe(&rebuilt), observe(&original));
    }
}
