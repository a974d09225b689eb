use crate::{
    bus::Bus,
    cpu::{Cpu, addressing::Operand, mnemonic::MAGIC, status::Status},
};

impl Cpu {
    pub(super) fn and(&mut self, value: u8) {
        self.a &= value;
        self.p.set_zn(self.a);
    }

    pub(super) fn ora(&mut self, value: u8) {
        self.a |= value;
        self.p.set_zn(self.a);
    }

    pub(super) fn eor(&mut self, value: u8) {
        self.a ^= value;
        self.p.set_zn(self.a);
    }

    pub(super) fn bit<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        let value = bus.read(op.addr);
        self.p.set(Status::ZERO, self.a & value == 0);
        self.p.set(Status::OVERFLOW, value & 0x40 != 0);
        self.p.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    /// `ANC #imm`: AND, then C copies N.
    pub(super) fn anc(&mut self, value: u8) {
        self.and(value);
        self.p.set(Status::CARRY, self.a & 0x80 != 0);
    }

    /// `ASR #imm` (a.k.a. `ALR`): AND, then LSR A.
    pub(super) fn asr(&mut self, value: u8) {
        self.a &= value;
        let a = self.a;
        self.a = self.lsr(a);
    }

    /// `ARR #imm`: AND, ROR A, with C from bit 6 and V from bit 6 ^ bit 5.
    pub(super) fn arr(&mut self, value: u8) {
        let and = self.a & value;
        self.a = and >> 1 | self.p.carry() << 7;
        self.p.set_zn(self.a);
        let bit6 = self.a & 0x40 != 0;
        let bit5 = self.a & 0x20 != 0;
        self.p.set(Status::CARRY, bit6);
        self.p.set(Status::OVERFLOW, bit6 ^ bit5);
    }

    /// `XAA #imm` (a.k.a. `ANE`).
    pub(super) fn xaa(&mut self, value: u8) {
        self.a = (self.a | MAGIC) & self.x & value;
        self.p.set_zn(self.a);
    }
}
