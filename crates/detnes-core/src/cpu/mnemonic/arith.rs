use crate::{
    bus::Bus,
    cpu::{Cpu, addressing::Operand, status::Status},
};

impl Cpu {
    /// Binary add with carry. Decimal mode is ignored on the 2A03.
    pub(super) fn adc(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + self.p.carry() as u16;
        let result = sum as u8;
        self.p.set(Status::CARRY, sum > 0xFF);
        self.p.set(
            Status::OVERFLOW,
            (self.a ^ result) & (value ^ result) & 0x80 != 0,
        );
        self.a = result;
        self.p.set_zn(result);
    }

    pub(super) fn sbc(&mut self, value: u8) {
        self.adc(!value);
    }

    pub(super) fn compare(&mut self, register: u8, value: u8) {
        self.p.set(Status::CARRY, register >= value);
        self.p.set_zn(register.wrapping_sub(value));
    }

    /// `INC`/`DEC` on memory; `delta` is `1` or `0xFF`.
    pub(super) fn step_memory<B: Bus>(&mut self, bus: &mut B, op: Operand, delta: u8) -> u8 {
        let value = bus.read(op.addr).wrapping_add(delta);
        bus.write(op.addr, value);
        self.p.set_zn(value);
        value
    }

    /// `DCP`: DEC memory, then CMP.
    pub(super) fn dcp<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        let value = self.step_memory(bus, op, 0xFF);
        self.compare(self.a, value);
    }

    /// `ISC` (a.k.a. `ISB`): INC memory, then SBC.
    pub(super) fn isc<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        let value = self.step_memory(bus, op, 0x01);
        self.sbc(value);
    }

    /// `SBX #imm` (a.k.a. `AXS`): X = (A & X) - imm, flags like CMP.
    pub(super) fn sbx(&mut self, value: u8) {
        let and = self.a & self.x;
        self.p.set(Status::CARRY, and >= value);
        self.x = and.wrapping_sub(value);
        self.p.set_zn(self.x);
    }
}
