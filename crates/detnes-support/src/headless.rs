//! Wall-clock independent stepping.
//!
//! A tick is a fixed number of instruction steps, so the same tick count
//! lands on the same machine state on every host regardless of how fast the
//! host runs.

use detnes_core::Console;
use tracing::debug;

use crate::activity::{Activity, PORTS};
use crate::error::SupportError;

/// Display cadence the browser host ticks at.
pub const FRAMES_PER_SECOND: f64 = 60.0;

pub struct HeadlessDriver {
    console: Console,
    steps_per_tick: u64,
    ticks: u64,
}

impl HeadlessDriver {
    /// `steps_per_tick` is clamped to at least one step.
    pub fn new(console: Console, steps_per_tick: u64) -> Self {
        Self {
            console,
            steps_per_tick: steps_per_tick.max(1),
            ticks: 0,
        }
    }

    /// Reconstructs a console from blobs and wraps it.
    pub fn from_blobs(
        static_bytes: &[u8],
        dynamic_bytes: &[u8],
        steps_per_tick: u64,
        audio_enabled: bool,
    ) -> Result<Self, SupportError> {
        let console = Console::new_headless(static_bytes, dynamic_bytes, audio_enabled)?;
        Ok(Self::new(console, steps_per_tick))
    }

    /// Runs `n` ticks and returns the CPU cycles they took.
    pub fn tick(&mut self, n: u64) -> u64 {
        let mut cycles = 0;
        for _ in 0..n {
            cycles += self.step_n(self.steps_per_tick);
            self.ticks += 1;
        }
        cycles
    }

    /// Replays `activity` from the current state. Returns the CPU cycles run.
    pub fn run(&mut self, activity: &Activity) -> u64 {
        debug!(
            actions = activity.actions().len(),
            ticks = activity.total_ticks(),
            "replaying activity"
        );
        let mut cycles = 0;
        for action in activity.actions() {
            self.console
                .controller_mut(action.port % PORTS)
                .set_buttons(action.buttons);
            cycles += self.tick(action.ticks);
        }
        cycles
    }

    /// One display frame's worth of steps at `speed`, the host's real-time
    /// cadence: `speed * (1 / 60 s) * cpu_hz` steps. Returns the steps run.
    pub fn tick_seconds(&mut self, speed: f64) -> u64 {
        let steps = steps_for_frame(speed, self.console.timing().cpu_hz);
        self.step_n(steps);
        steps
    }

    fn step_n(&mut self, steps: u64) -> u64 {
        (0..steps).map(|_| self.console.step() as u64).sum()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn steps_per_tick(&self) -> u64 {
        self.steps_per_tick
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn into_console(self) -> Console {
        self.console
    }
}

fn steps_for_frame(speed: f64, cpu_hz: u32) -> u64 {
    (speed.max(0.0) / FRAMES_PER_SECOND * cpu_hz as f64) as u64
}
