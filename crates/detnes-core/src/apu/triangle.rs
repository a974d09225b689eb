//! Triangle channel.

use serde::{Deserialize, Serialize};

use super::{length_counter::LengthCounter, tables::TRIANGLE_SEQUENCE};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(super) struct Triangle {
    enabled: bool,
    /// Doubles as the length counter halt flag.
    control: bool,
    linear_reload_value: u8,
    linear_counter: u8,
    linear_reload: bool,
    timer: u16,
    timer_period: u16,
    step: u8,
    length: LengthCounter,
}

impl Triangle {
    pub(super) fn write(&mut self, reg: u16, value: u8) {
        match reg & 0x03 {
            0 => {
                self.control = value & 0x80 != 0;
                self.linear_reload_value = value & 0x7F;
            }
            1 => {}
            2 => self.timer_period = (self.timer_period & 0xFF00) | value as u16,
            _ => {
                self.timer_period = (self.timer_period & 0x00FF) | ((value as u16 & 0x07) << 8);
                self.length.load(value >> 3, self.enabled);
                self.linear_reload = true;
            }
        }
    }

    pub(super) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length.clear();
        }
    }

    /// Clocked every CPU cycle; the sequencer only moves while both counters
    /// are non-zero.
    pub(super) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.timer_period;
            if self.length.active() && self.linear_counter > 0 {
                self.step = (self.step + 1) & 0x1F;
            }
        } else {
            self.timer -= 1;
        }
    }

    pub(super) fn clock_quarter(&mut self) {
        if self.linear_reload {
            self.linear_counter = self.linear_reload_value;
        } else if self.linear_counter > 0 {
            self.linear_counter -= 1;
        }
        if !self.control {
            self.linear_reload = false;
        }
    }

    pub(super) fn clock_half(&mut self) {
        self.length.clock(self.control);
    }

    /// Holds the last sequencer value when silenced, like the hardware DAC.
    pub(super) fn output(&self) -> u8 {
        TRIANGLE_SEQUENCE[self.step as usize]
    }

    pub(super) fn validate(&self) -> Result<(), &'static str> {
        if self.step as usize >= TRIANGLE_SEQUENCE.len() {
            return Err("triangle sequencer step");
        }
        Ok(())
    }

    pub(super) fn length_active(&self) -> bool {
        self.length.active()
    }
}
