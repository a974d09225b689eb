use crate::{
    bus::Bus,
    cpu::{
        Cpu,
        addressing::{Addressing, Operand},
        status::Status,
    },
    memory::cpu::IRQ_VECTOR,
};

impl Cpu {
    /// Returns the extra cycles of a taken branch.
    pub(super) fn branch(&mut self, taken: bool, op: Operand) -> u32 {
        if !taken {
            return 0;
        }
        self.pc = op.addr;
        1 + op.crossed as u32
    }

    pub(super) fn brk<B: Bus>(&mut self, bus: &mut B) {
        // The byte after BRK is skipped.
        let ret = self.pc.wrapping_add(1);
        self.push_u16(bus, ret);
        self.push(bus, self.p.pushed(true));
        self.p.insert(Status::INTERRUPT);
        self.pc = bus.read_u16(IRQ_VECTOR);
    }

    pub(super) fn jsr<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        let ret = self.pc.wrapping_sub(1);
        self.push_u16(bus, ret);
        self.pc = op.addr;
    }

    pub(super) fn rts<B: Bus>(&mut self, bus: &mut B) {
        self.pc = self.pop_u16(bus).wrapping_add(1);
    }

    pub(super) fn rti<B: Bus>(&mut self, bus: &mut B) {
        self.p = Status::pulled(self.pop(bus));
        self.pc = self.pop_u16(bus);
    }

    /// Locks the processor on the JAM opcode until reset.
    pub(super) fn jam(&mut self) {
        self.halted = true;
        self.pc = self.pc.wrapping_sub(1);
    }

    /// Unofficial NOPs still perform their operand read.
    pub(super) fn nop<B: Bus>(&mut self, bus: &mut B, mode: Addressing, op: Operand) {
        if !matches!(mode, Addressing::Implied | Addressing::Immediate) {
            bus.read(op.addr);
        }
    }
}
