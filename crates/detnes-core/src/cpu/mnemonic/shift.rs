use crate::{
    bus::Bus,
    cpu::{
        Cpu,
        addressing::{Addressing, Operand},
        status::Status,
    },
};

impl Cpu {
    /// Read-modify-write on A or memory.
    pub(super) fn modify<B: Bus>(
        &mut self,
        bus: &mut B,
        mode: Addressing,
        op: Operand,
        f: fn(&mut Cpu, u8) -> u8,
    ) -> u8 {
        if mode == Addressing::Accumulator {
            let a = self.a;
            self.a = f(self, a);
            self.a
        } else {
            let value = f(self, bus.read(op.addr));
            bus.write(op.addr, value);
            value
        }
    }

    pub(super) fn asl(&mut self, value: u8) -> u8 {
        self.p.set(Status::CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.p.set_zn(result);
        result
    }

    pub(super) fn lsr(&mut self, value: u8) -> u8 {
        self.p.set(Status::CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.p.set_zn(result);
        result
    }

    pub(super) fn rol(&mut self, value: u8) -> u8 {
        let carry_in = self.p.carry();
        self.p.set(Status::CARRY, value & 0x80 != 0);
        let result = value << 1 | carry_in;
        self.p.set_zn(result);
        result
    }

    pub(super) fn ror(&mut self, value: u8) -> u8 {
        let carry_in = self.p.carry();
        self.p.set(Status::CARRY, value & 0x01 != 0);
        let result = value >> 1 | carry_in << 7;
        self.p.set_zn(result);
        result
    }

    pub(super) fn slo<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        let value = self.modify(bus, Addressing::Absolute, op, Cpu::asl);
        self.ora(value);
    }

    pub(super) fn rla<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        let value = self.modify(bus, Addressing::Absolute, op, Cpu::rol);
        self.and(value);
    }

    pub(super) fn sre<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        let value = self.modify(bus, Addressing::Absolute, op, Cpu::lsr);
        self.eor(value);
    }

    pub(super) fn rra<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        let value = self.modify(bus, Addressing::Absolute, op, Cpu::ror);
        self.adc(value);
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::tests::{run, run_with_bus};

    #[test]
    fn ror_accumulator_through_carry() {
        // SEC; LDA #$01; ROR A
        let cpu = run(&[0x38, 0xA9, 0x01, 0x6A], |_| {}, 3);
        assert_eq!(cpu.a(), 0x80);
        assert_eq!(cpu.p() & 0x81, 0x81);
    }

    #[test]
    fn slo_shifts_memory_then_ors() {
        // LDA #$01; SLO $10
        let (cpu, bus) = run_with_bus(&[0xA9, 0x01, 0x07, 0x10], |bus| bus.mem[0x10] = 0xC0, 2);
        assert_eq!(bus.mem[0x10], 0x80);
        assert_eq!(cpu.a(), 0x81);
        assert_eq!(cpu.p() & 0x01, 0x01);
    }

    #[test]
    fn rra_rotates_then_adds_with_new_carry() {
        // CLC; LDA #$10; RRA $10
        let (cpu, bus) = run_with_bus(&[0x18, 0xA9, 0x10, 0x67, 0x10], |bus| bus.mem[0x10] = 0x03, 3);
        assert_eq!(bus.mem[0x10], 0x01);
        assert_eq!(cpu.a(), 0x12);
    }

    #[test]
    fn sre_shifts_then_eors() {
        // LDA #$FF; SRE $10
        let (cpu, bus) = run_with_bus(&[0xA9, 0xFF, 0x47, 0x10], |bus| bus.mem[0x10] = 0x02, 2);
        assert_eq!(bus.mem[0x10], 0x01);
        assert_eq!(cpu.a(), 0xFE);
    }

    #[test]
    fn rla_rotates_then_ands() {
        // SEC; LDA #$0F; RLA $10
        let (cpu, bus) = run_with_bus(&[0x38, 0xA9, 0x0F, 0x27, 0x10], |bus| bus.mem[0x10] = 0x04, 3);
        assert_eq!(bus.mem[0x10], 0x09);
        assert_eq!(cpu.a(), 0x09);
    }
}
