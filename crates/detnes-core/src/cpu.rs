//! 2A03 processor core (6502 without decimal mode).
//!
//! The core is stepped one instruction at a time. Interrupt entry is handled
//! as a pseudo-instruction with a fixed cost so that every call to
//! [`Cpu::step`] is one indivisible unit of work.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    bus::Bus,
    cpu::{lookup::LOOKUP_TABLE, status::Status},
    memory::cpu::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR},
};

pub mod addressing;
mod lookup;
mod mnemonic;
pub mod status;

/// Cost of the NMI/IRQ entry sequence.
pub const INTERRUPT_CYCLES: u32 = 7;
/// Cost of each step while the processor is jammed.
pub const JAM_CYCLES: u32 = 2;
const POWER_ON_SP: u8 = 0xFD;

/// Plain copy of the programmer-visible registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
    pub pc: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    a: u8,
    x: u8,
    y: u8,
    s: u8,
    p: Status,
    pc: u16,
    /// Total CPU cycles since power on, stalls included.
    cycles: u64,
    /// Latched NMI edge, serviced at the next instruction boundary.
    nmi_pending: bool,
    /// Value of `I` that IRQ polling sees. Lags `p` by one instruction
    /// after CLI, SEI and PLP.
    irq_inhibit: bool,
    /// A JAM opcode locked the bus.
    halted: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: POWER_ON_SP,
            p: Status::default(),
            pc: 0,
            cycles: 0,
            nmi_pending: false,
            irq_inhibit: true,
            halted: false,
        }
    }

    /// Cold boot: registers cleared and PC loaded from the reset vector.
    pub fn power_on<B: Bus>(&mut self, bus: &mut B) {
        *self = Self::new();
        self.pc = bus.read_u16(RESET_VECTOR);
        self.cycles = INTERRUPT_CYCLES as u64;
    }

    /// Warm reset: A/X/Y survive, S drops by three as if three pushes were
    /// suppressed, and `I` is set.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.s = self.s.wrapping_sub(3);
        self.p.insert(Status::INTERRUPT);
        self.irq_inhibit = true;
        self.nmi_pending = false;
        self.halted = false;
        self.pc = bus.read_u16(RESET_VECTOR);
        self.cycles += INTERRUPT_CYCLES as u64;
    }

    /// Executes one instruction, or enters a pending interrupt, and returns
    /// the CPU cycles it took.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let cycles = if self.halted {
            JAM_CYCLES
        } else if self.nmi_pending {
            self.nmi_pending = false;
            self.interrupt(bus, NMI_VECTOR);
            INTERRUPT_CYCLES
        } else if !self.irq_inhibit && bus.irq_line() {
            self.interrupt(bus, IRQ_VECTOR);
            INTERRUPT_CYCLES
        } else {
            self.execute(bus)
        };
        self.cycles += cycles as u64;
        cycles
    }

    fn execute<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let opcode = self.fetch(bus);
        let entry = LOOKUP_TABLE[opcode as usize];
        let masked_before = self.p.contains(Status::INTERRUPT);

        let operand = self.operand(bus, entry.mode);
        let extra = self.dispatch(bus, entry.mnemonic, entry.mode, operand);

        self.irq_inhibit = if entry.mnemonic.delays_irq_mask() {
            masked_before
        } else {
            self.p.contains(Status::INTERRUPT)
        };
        entry.cycle.total(operand.crossed) + extra
    }

    fn interrupt<B: Bus>(&mut self, bus: &mut B, vector: u16) {
        trace!(vector, pc = self.pc, "interrupt");
        self.push_u16(bus, self.pc);
        self.push(bus, self.p.pushed(false));
        self.p.insert(Status::INTERRUPT);
        self.irq_inhibit = true;
        self.pc = bus.read_u16(vector);
    }

    /// Latches an NMI edge from the PPU.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Accounts for cycles the CPU spent suspended by DMA.
    pub fn stall(&mut self, cycles: u32) {
        self.cycles += cycles as u64;
    }

    pub(crate) fn fetch<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    pub(crate) fn fetch_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch(bus) as u16;
        let hi = self.fetch(bus) as u16;
        hi << 8 | lo
    }

    pub fn registers(&self) -> Registers {
        Registers {
            a: self.a,
            x: self.x,
            y: self.y,
            s: self.s,
            p: self.p.bits(),
            pc: self.pc,
        }
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn s(&self) -> u8 {
        self.s
    }

    pub fn p(&self) -> u8 {
        self.p.bits()
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::bus::mock::MockBus;

    /// Powers on a CPU with `program` at `$8000`.
    pub(crate) fn cpu_with(program: &[u8], setup: impl FnOnce(&mut MockBus)) -> (Cpu, MockBus) {
        let mut bus = MockBus::with_program(0x8000, program);
        setup(&mut bus);
        let mut cpu = Cpu::new();
        cpu.power_on(&mut bus);
        (cpu, bus)
    }

    pub(crate) fn run_with_bus(
        program: &[u8],
        setup: impl FnOnce(&mut MockBus),
        steps: usize,
    ) -> (Cpu, MockBus) {
        let (mut cpu, mut bus) = cpu_with(program, setup);
        for _ in 0..steps {
            cpu.step(&mut bus);
        }
        (cpu, bus)
    }

    pub(crate) fn run(program: &[u8], setup: impl FnOnce(&mut MockBus), steps: usize) -> Cpu {
        run_with_bus(program, setup, steps).0
    }

    fn vectors(bus: &mut MockBus) {
        bus.mem[0xFFFA] = 0x00;
        bus.mem[0xFFFB] = 0x90;
        bus.mem[0xFFFE] = 0x00;
        bus.mem[0xFFFF] = 0xA0;
    }

    #[test]
    fn power_on_state() {
        let (cpu, _) = cpu_with(&[], |_| {});
        assert_eq!(cpu.registers(), Registers { a: 0, x: 0, y: 0, s: 0xFD, p: 0x24, pc: 0x8000 });
        assert_eq!(cpu.cycles(), 7);
    }

    #[test]
    fn reset_keeps_registers_and_drops_stack_pointer() {
        let (mut cpu, mut bus) = cpu_with(&[0xA9, 0x42, 0x58], |_| {});
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        cpu.reset(&mut bus);
        assert_eq!(cpu.a(), 0x42);
        assert_eq!(cpu.s(), 0xFA);
        assert_eq!(cpu.p() & 0x04, 0x04);
        assert_eq!(cpu.pc(), 0x8000);
    }

    #[test]
    fn absolute_x_page_cross_adds_a_cycle() {
        // LDX #$01; LDA $10FF,X; LDA $1000,X
        let (mut cpu, mut bus) = cpu_with(&[0xA2, 0x01, 0xBD, 0xFF, 0x10, 0xBD, 0x00, 0x10], |_| {});
        assert_eq!(cpu.step(&mut bus), 2);
        assert_eq!(cpu.step(&mut bus), 5);
        assert_eq!(cpu.step(&mut bus), 4);
        assert_eq!(cpu.cycles(), 7 + 11);
    }

    #[test]
    fn nmi_is_serviced_even_when_masked() {
        let (mut cpu, mut bus) = cpu_with(&[0xEA, 0xEA], vectors);
        cpu.step(&mut bus);
        cpu.trigger_nmi();
        assert_eq!(cpu.step(&mut bus), INTERRUPT_CYCLES);
        assert_eq!(cpu.pc(), 0x9000);
        // Return address then flags with B clear.
        assert_eq!(bus.mem[0x01FD], 0x80);
        assert_eq!(bus.mem[0x01FC], 0x01);
        assert_eq!(bus.mem[0x01FB] & 0x30, 0x20);
        assert!(!cpu.nmi_pending());
    }

    #[test]
    fn irq_waits_for_cli_latency() {
        // CLI; NOP; NOP
        let (mut cpu, mut bus) = cpu_with(&[0x58, 0xEA, 0xEA], vectors);
        bus.irq = true;
        cpu.step(&mut bus);
        // The instruction after CLI still runs with IRQs masked.
        cpu.step(&mut bus);
        assert_eq!(cpu.pc(), 0x8002);
        assert_eq!(cpu.step(&mut bus), INTERRUPT_CYCLES);
        assert_eq!(cpu.pc(), 0xA000);
        assert_eq!(cpu.p() & 0x04, 0x04);
    }

    #[test]
    fn masked_irq_is_ignored() {
        let (mut cpu, mut bus) = cpu_with(&[0xEA, 0xEA], vectors);
        bus.irq = true;
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.pc(), 0x8002);
    }

    #[test]
    fn rti_restores_mask_immediately() {
        // IRQ handler at $A000: RTI. Main: CLI; NOP; NOP.
        let (mut cpu, mut bus) = cpu_with(&[0x58, 0xEA, 0xEA], |bus| {
            vectors(bus);
            bus.mem[0xA000] = 0x40;
        });
        bus.irq = true;
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        bus.irq = false;
        cpu.step(&mut bus);
        assert_eq!(cpu.pc(), 0x8002);
        assert_eq!(cpu.p() & 0x04, 0x00);
    }

    proptest! {
        #[test]
        fn every_opcode_is_total(opcode in any::<u8>(), operands in any::<[u8; 2]>(), regs in any::<[u8; 3]>()) {
            let (mut cpu, mut bus) = cpu_with(&[opcode, operands[0], operands[1]], |_| {});
            cpu.a = regs[0];
            cpu.x = regs[1];
            cpu.y = regs[2];
            let cycles = cpu.step(&mut bus);
            prop_assert!((2..=8).contains(&cycles), "opcode {opcode:02X} took {cycles}");
        }
    }
}
