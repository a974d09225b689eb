//! Envelope unit shared by pulse and noise channels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(super) struct Envelope {
    loop_flag: bool,
    constant_volume: bool,
    volume: u8,
    start: bool,
    divider: u8,
    decay_level: u8,
}

impl Envelope {
    pub(super) fn configure(&mut self, value: u8) {
        self.loop_flag = value & 0b0010_0000 != 0;
        self.constant_volume = value & 0b0001_0000 != 0;
        self.volume = value & 0b0000_1111;
    }

    pub(super) fn restart(&mut self) {
        self.start = true;
    }

    pub(super) fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay_level = 15;
            self.divider = self.volume;
            return;
        }

        if self.divider == 0 {
            self.divider = self.volume;
            if self.decay_level > 0 {
                self.decay_level -= 1;
            } else if self.loop_flag {
                self.decay_level = 15;
            }
        } else {
            self.divider -= 1;
        }
    }

    pub(super) fn output(&self) -> u8 {
        if self.constant_volume {
            self.volume
        } else {
            self.decay_level
        }
    }

    pub(super) fn validate(&self) -> Result<(), &'static str> {
        if self.volume > 0x0F || self.decay_level > 0x0F {
            return Err("envelope level");
        }
        Ok(())
    }

    /// The loop flag doubles as the length counter halt bit.
    pub(super) fn halt_length(&self) -> bool {
        self.loop_flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decays_from_fifteen_and_loops() {
        let mut envelope = Envelope::default();
        envelope.configure(0b0010_0000);
        envelope.restart();
        envelope.clock();
        assert_eq!(envelope.output(), 15);
        for _ in 0..15 {
            envelope.clock();
        }
        assert_eq!(envelope.output(), 0);
        envelope.clock();
        assert_eq!(envelope.output(), 15);
    }

    #[test]
    fn validate_rejects_levels_above_four_bits() {
        let mut envelope = Envelope::default();
        envelope.configure(0x1F);
        assert_eq!(envelope.validate(), Ok(()));
        envelope.volume = 16;
        assert_eq!(envelope.validate(), Err("envelope level"));
        envelope.volume = 0;
        envelope.decay_level = 16;
        assert_eq!(envelope.validate(), Err("envelope level"));
    }
}
