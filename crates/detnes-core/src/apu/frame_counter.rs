//! Frame sequencer driving envelopes, length counters and sweeps.
//!
//! Step positions are counted in CPU cycles since the last `$4017` write.

use serde::{Deserialize, Serialize};

/// Quarter/half frame clocks produced by one sequencer cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct FrameTick {
    pub quarter: bool,
    pub half: bool,
}

impl FrameTick {
    const NONE: FrameTick = FrameTick {
        quarter: false,
        half: false,
    };
    const QUARTER: FrameTick = FrameTick {
        quarter: true,
        half: false,
    };
    const BOTH: FrameTick = FrameTick {
        quarter: true,
        half: true,
    };
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(super) enum FrameMode {
    #[default]
    FourStep,
    FiveStep,
}

/// Cycle of each step; the fifth is only reached in five-step mode.
const NTSC_STEPS: [u32; 5] = [7457, 14913, 22371, 29829, 37281];
const PAL_STEPS: [u32; 5] = [8313, 16627, 24939, 33252, 41565];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(super) struct FrameCounter {
    mode: FrameMode,
    irq_inhibit: bool,
    cycle: u32,
    interrupt: bool,
    /// Last value written to `$4017`, re-applied on reset.
    last_write: u8,
}

impl FrameCounter {
    /// Handles a `$4017` write. Five-step mode clocks both units immediately.
    pub(super) fn write(&mut self, value: u8) -> FrameTick {
        self.last_write = value;
        self.mode = if value & 0x80 != 0 {
            FrameMode::FiveStep
        } else {
            FrameMode::FourStep
        };
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.interrupt = false;
        }
        self.cycle = 0;
        match self.mode {
            FrameMode::FiveStep => FrameTick::BOTH,
            FrameMode::FourStep => FrameTick::NONE,
        }
    }

    pub(super) fn reset(&mut self) -> FrameTick {
        self.interrupt = false;
        self.write(self.last_write)
    }

    pub(super) fn interrupt(&self) -> bool {
        self.interrupt
    }

    pub(super) fn acknowledge(&mut self) {
        self.interrupt = false;
    }

    fn period(&self, steps: &[u32; 5]) -> u32 {
        match self.mode {
            FrameMode::FourStep => steps[3] + 1,
            FrameMode::FiveStep => steps[4] + 1,
        }
    }

    pub(super) fn validate(&self, pal: bool) -> Result<(), &'static str> {
        let steps = if pal { &PAL_STEPS } else { &NTSC_STEPS };
        if self.cycle >= self.period(steps) {
            return Err("frame sequencer cycle");
        }
        Ok(())
    }

    pub(super) fn clock(&mut self, pal: bool) -> FrameTick {
        let steps = if pal { &PAL_STEPS } else { &NTSC_STEPS };
        self.cycle += 1;
        let tick = match steps.iter().position(|&step| step == self.cycle) {
            Some(0) | Some(2) => FrameTick::QUARTER,
            Some(1) => FrameTick::BOTH,
            Some(3) if self.mode == FrameMode::FourStep => {
                if !self.irq_inhibit {
                    self.interrupt = true;
                }
                FrameTick::BOTH
            }
            Some(4) => FrameTick::BOTH,
            _ => FrameTick::NONE,
        };
        if self.cycle >= self.period(steps) {
            self.cycle = 0;
        }
        tick
    }
}
