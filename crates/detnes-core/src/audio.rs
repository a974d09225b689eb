//! Host-facing audio: mixing channel levels into PCM and queueing samples.
//!
//! Nothing here is machine state. The queue and the resampling accumulator
//! are rebuilt empty whenever a console is constructed, and a console that
//! never produces samples steps through exactly the same states.

use std::collections::VecDeque;

use crate::apu::ChannelLevels;

const PULSE_TABLE_LEN: usize = 31;
const TND_TABLE_LEN: usize = 203;

/// Non-linear DAC approximation as two lookup tables.
#[derive(Debug, Clone)]
pub struct Mixer {
    pulse: [f32; PULSE_TABLE_LEN],
    tnd: [f32; TND_TABLE_LEN],
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    pub fn new() -> Self {
        let mut pulse = [0.0; PULSE_TABLE_LEN];
        for (n, slot) in pulse.iter_mut().enumerate().skip(1) {
            *slot = 95.52 / (8128.0 / n as f32 + 100.0);
        }
        let mut tnd = [0.0; TND_TABLE_LEN];
        for (n, slot) in tnd.iter_mut().enumerate().skip(1) {
            *slot = 163.67 / (24329.0 / n as f32 + 100.0);
        }
        Self { pulse, tnd }
    }

    /// Mixed output in `0.0..1.0`.
    pub fn mix(&self, levels: ChannelLevels) -> f32 {
        let pulse = levels.pulse1 as usize + levels.pulse2 as usize;
        let tnd = 3 * levels.triangle as usize + 2 * levels.noise as usize + levels.dmc as usize;
        self.pulse[pulse.min(PULSE_TABLE_LEN - 1)] + self.tnd[tnd.min(TND_TABLE_LEN - 1)]
    }
}

/// Mono sample queue fed once per CPU cycle.
///
/// A sample is taken whenever `sample_rate` accumulated ticks pass `cpu_hz`,
/// so the cadence is exact over any interval with no floating point drift.
/// The queue holds at most one second of audio; when the host falls behind
/// the oldest samples are dropped.
#[derive(Debug, Clone)]
pub struct AudioOutput {
    mixer: Mixer,
    sample_rate: u32,
    cpu_hz: u32,
    accumulator: u64,
    capacity: usize,
    samples: VecDeque<f32>,
}

impl AudioOutput {
    pub fn new(sample_rate: u32, cpu_hz: u32) -> Self {
        let capacity = sample_rate.max(1) as usize;
        Self {
            mixer: Mixer::new(),
            sample_rate,
            cpu_hz,
            accumulator: 0,
            capacity,
            samples: VecDeque::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Called once per CPU cycle with the current channel levels.
    #[inline]
    pub fn clock(&mut self, levels: impl FnOnce() -> ChannelLevels) {
        self.accumulator += self.sample_rate as u64;
        if self.accumulator >= self.cpu_hz as u64 {
            self.accumulator -= self.cpu_hz as u64;
            if self.samples.len() == self.capacity {
                self.samples.pop_front();
            }
            self.samples.push_back(self.mixer.mix(levels()));
        }
    }

    pub fn pending(&self) -> usize {
        self.samples.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn take(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples).into()
    }
}
