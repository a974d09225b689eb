use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Processor status register (P).
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N V _ B D I Z C
    /// ```
    ///
    /// `B` and the unused bit only exist on the stack copy; pulls ignore `B`
    /// and force the unused bit high.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Status: u8 {
        const CARRY     = 0b0000_0001;
        const ZERO      = 0b0000_0010;
        /// Masks IRQ, never NMI.
        const INTERRUPT = 0b0000_0100;
        /// Stored but ignored by the 2A03 ALU.
        const DECIMAL   = 0b0000_1000;
        const BREAK     = 0b0001_0000;
        const UNUSED    = 0b0010_0000;
        const OVERFLOW  = 0b0100_0000;
        const NEGATIVE  = 0b1000_0000;
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::INTERRUPT | Status::UNUSED
    }
}

impl Status {
    pub fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    pub fn carry(self) -> u8 {
        self.contains(Status::CARRY) as u8
    }

    /// Byte pushed by PHP/BRK (`brk = true`) or by NMI/IRQ entry.
    pub fn pushed(self, brk: bool) -> u8 {
        let mut pushed = self | Status::UNUSED;
        pushed.set(Status::BREAK, brk);
        pushed.bits()
    }

    /// Value restored by PLP/RTI.
    pub fn pulled(byte: u8) -> Self {
        (Status::from_bits_retain(byte) - Status::BREAK) | Status::UNUSED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zn_follow_the_value() {
        let mut p = Status::default();
        p.set_zn(0);
        assert!(p.contains(Status::ZERO) && !p.contains(Status::NEGATIVE));
        p.set_zn(0x80);
        assert!(!p.contains(Status::ZERO) && p.contains(Status::NEGATIVE));
    }

    #[test]
    fn break_bit_only_exists_on_the_stack() {
        let p = Status::CARRY | Status::UNUSED;
        assert_eq!(p.pushed(true), 0x31);
        assert_eq!(p.pushed(false), 0x21);
        assert_eq!(Status::pulled(0xFF).bits(), 0xEF);
        assert_eq!(Status::pulled(0x00).bits(), 0x20);
    }
}
