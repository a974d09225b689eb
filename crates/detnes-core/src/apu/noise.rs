//! Noise channel: a 15 bit LFSR gated by an envelope.

use serde::{Deserialize, Serialize};

use super::{
    envelope::Envelope,
    length_counter::LengthCounter,
    tables::{NOISE_PERIOD_NTSC, NOISE_PERIOD_PAL},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(super) struct Noise {
    enabled: bool,
    /// Short mode taps bit 6 instead of bit 1.
    mode: bool,
    period_index: u8,
    timer: u16,
    shift: u16,
    envelope: Envelope,
    length: LengthCounter,
}

impl Default for Noise {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: false,
            period_index: 0,
            timer: 0,
            shift: 1,
            envelope: Envelope::default(),
            length: LengthCounter::default(),
        }
    }
}

impl Noise {
    pub(super) fn write(&mut self, reg: u16, value: u8) {
        match reg & 0x03 {
            0 => self.envelope.configure(value),
            1 => {}
            2 => {
                self.mode = value & 0x80 != 0;
                self.period_index = value & 0x0F;
            }
            _ => {
                self.length.load(value >> 3, self.enabled);
                self.envelope.restart();
            }
        }
    }

    pub(super) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length.clear();
        }
    }

    /// Clocked every CPU cycle; the period tables are in CPU cycles.
    pub(super) fn clock_timer(&mut self, pal: bool) {
        if self.timer == 0 {
            let table = if pal { &NOISE_PERIOD_PAL } else { &NOISE_PERIOD_NTSC };
            self.timer = table[self.period_index as usize] - 1;
            let tap = if self.mode { 6 } else { 1 };
            let feedback = (self.shift ^ (self.shift >> tap)) & 0x01;
            self.shift = (self.shift >> 1) | (feedback << 14);
        } else {
            self.timer -= 1;
        }
    }

    pub(super) fn clock_quarter(&mut self) {
        self.envelope.clock();
    }

    pub(super) fn clock_half(&mut self) {
        self.length.clock(self.envelope.halt_length());
    }

    pub(super) fn output(&self) -> u8 {
        if !self.length.active() || self.shift & 0x01 != 0 {
            0
        } else {
            self.envelope.output()
        }
    }

    pub(super) fn validate(&self) -> Result<(), &'static str> {
        if self.period_index as usize >= NOISE_PERIOD_NTSC.len() {
            return Err("noise period index");
        }
        self.envelope.validate()
    }

    pub(super) fn length_active(&self) -> bool {
        self.length.active()
    }
}
