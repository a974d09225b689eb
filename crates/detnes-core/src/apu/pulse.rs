//! Pulse channels with their sweep units.

use serde::{Deserialize, Serialize};

use super::{envelope::Envelope, length_counter::LengthCounter, tables::PULSE_DUTY_TABLE};

/// The two pulse channels differ only in how the sweep negates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(super) enum PulseChannel {
    /// Ones' complement: subtracts one extra.
    Pulse1,
    Pulse2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(super) struct Sweep {
    enabled: bool,
    negate: bool,
    shift: u8,
    period: u8,
    divider: u8,
    reload: bool,
    channel: PulseChannel,
}

impl Sweep {
    fn new(channel: PulseChannel) -> Self {
        Self {
            enabled: false,
            negate: false,
            shift: 0,
            period: 0,
            divider: 0,
            reload: false,
            channel,
        }
    }

    fn write(&mut self, value: u8) {
        self.enabled = value & 0b1000_0000 != 0;
        self.period = (value >> 4) & 0b0000_0111;
        self.negate = value & 0b0000_1000 != 0;
        self.shift = value & 0b0000_0111;
        self.reload = true;
    }

    /// Muting is evaluated continuously, even with the sweep disabled.
    fn muted(&self, timer_period: u16) -> bool {
        timer_period < 8 || self.target_period(timer_period) > 0x07FF
    }

    /// A negated target never goes below zero, so it cannot trip the
    /// overflow mute.
    fn target_period(&self, timer_period: u16) -> u16 {
        let delta = timer_period >> self.shift;
        match (self.negate, self.channel) {
            (false, _) => timer_period + delta,
            (true, PulseChannel::Pulse1) => timer_period.saturating_sub(delta + 1),
            (true, PulseChannel::Pulse2) => timer_period - delta,
        }
    }

    fn clock(&mut self, timer_period: &mut u16) {
        if self.divider == 0 && self.enabled && self.shift != 0 && !self.muted(*timer_period) {
            *timer_period = self.target_period(*timer_period);
        }
        if self.divider == 0 || self.reload {
            self.divider = self.period;
            self.reload = false;
        } else {
            self.divider -= 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(super) struct Pulse {
    enabled: bool,
    duty: u8,
    duty_pos: u8,
    timer: u16,
    timer_period: u16,
    /// The sequencer advances on every other timer reload.
    phase_toggle: bool,
    envelope: Envelope,
    length: LengthCounter,
    sweep: Sweep,
}

impl Pulse {
    pub(super) fn new(channel: PulseChannel) -> Self {
        Self {
            enabled: false,
            duty: 0,
            duty_pos: 0,
            timer: 0,
            timer_period: 0,
            phase_toggle: false,
            envelope: Envelope::default(),
            length: LengthCounter::default(),
            sweep: Sweep::new(channel),
        }
    }

    /// `reg` is the register offset within the channel, `0..=3`.
    pub(super) fn write(&mut self, reg: u16, value: u8) {
        match reg & 0x03 {
            0 => {
                self.duty = (value >> 6) & 0b0000_0011;
                self.envelope.configure(value);
            }
            1 => self.sweep.write(value),
            2 => self.timer_period = (self.timer_period & 0xFF00) | value as u16,
            _ => {
                self.timer_period = (self.timer_period & 0x00FF) | ((value as u16 & 0x07) << 8);
                self.length.load(value >> 3, self.enabled);
                self.duty_pos = 0;
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

    pub(super) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.timer_period;
            self.phase_toggle = !self.phase_toggle;
            if self.phase_toggle {
                self.duty_pos = (self.duty_pos + 1) & 0b111;
            }
        } else {
            self.timer -= 1;
        }
    }

    pub(super) fn clock_quarter(&mut self) {
        self.envelope.clock();
    }

    pub(super) fn clock_half(&mut self) {
        self.length.clock(self.envelope.halt_length());
        self.sweep.clock(&mut self.timer_period);
    }

    pub(super) fn output(&self) -> u8 {
        if !self.length.active()
            || self.sweep.muted(self.timer_period)
            || PULSE_DUTY_TABLE[self.duty as usize][self.duty_pos as usize] == 0
        {
            return 0;
        }
        self.envelope.output()
    }

    pub(super) fn validate(&self) -> Result<(), &'static str> {
        let Some(sequence) = PULSE_DUTY_TABLE.get(self.duty as usize) else {
            return Err("pulse duty");
        };
        if self.duty_pos as usize >= sequence.len() {
            return Err("pulse duty position");
        }
        if self.sweep.shift > 0x07 {
            return Err("pulse sweep shift");
        }
        if self.timer_period > 0x07FF {
            return Err("pulse timer period");
        }
        self.envelope.validate()
    }

    pub(super) fn length_active(&self) -> bool {
        self.length.active()
    }
}
