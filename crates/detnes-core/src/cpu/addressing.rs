use crate::{
    bus::Bus,
    cpu::Cpu,
};

/// 6502 addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Addressing {
    Implied,
    Accumulator,
    Immediate,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `JMP ($xxxx)` only. The pointer high byte never leaves its page.
    Indirect,
    /// `($zp,X)`: pointer read from the zero page after adding X.
    IndirectX,
    /// `($zp),Y`: pointer read from the zero page, then Y added.
    IndirectY,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
}

/// Resolved effective address of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Operand {
    pub(crate) addr: u16,
    /// Address before indexing, used by the unstable SHx stores.
    pub(crate) base: u16,
    /// Indexing (or a branch target) crossed into another page.
    pub(crate) crossed: bool,
}

impl Operand {
    fn direct(addr: u16) -> Self {
        Self {
            addr,
            base: addr,
            crossed: false,
        }
    }

    fn indexed(base: u16, index: u8) -> Self {
        let addr = base.wrapping_add(index as u16);
        Self {
            addr,
            base,
            crossed: page_crossed(base, addr),
        }
    }
}

#[inline]
pub(crate) fn page_crossed(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

impl Cpu {
    /// Consumes the operand bytes after the opcode and computes the
    /// effective address. No data access happens here.
    pub(crate) fn operand<B: Bus>(&mut self, bus: &mut B, mode: Addressing) -> Operand {
        match mode {
            Addressing::Implied | Addressing::Accumulator => Operand::direct(self.pc),
            Addressing::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                Operand::direct(addr)
            }
            Addressing::ZeroPage => Operand::direct(self.fetch(bus) as u16),
            Addressing::ZeroPageX => {
                let base = self.fetch(bus);
                Operand::direct(base.wrapping_add(self.x) as u16)
            }
            Addressing::ZeroPageY => {
                let base = self.fetch(bus);
                Operand::direct(base.wrapping_add(self.y) as u16)
            }
            Addressing::Absolute => Operand::direct(self.fetch_u16(bus)),
            Addressing::AbsoluteX => {
                let base = self.fetch_u16(bus);
                Operand::indexed(base, self.x)
            }
            Addressing::AbsoluteY => {
                let base = self.fetch_u16(bus);
                Operand::indexed(base, self.y)
            }
            Addressing::Indirect => {
                let ptr = self.fetch_u16(bus);
                Operand::direct(read_u16_same_page(bus, ptr))
            }
            Addressing::IndirectX => {
                let ptr = self.fetch(bus).wrapping_add(self.x);
                Operand::direct(read_u16_zero_page(bus, ptr))
            }
            Addressing::IndirectY => {
                let ptr = self.fetch(bus);
                let base = read_u16_zero_page(bus, ptr);
                Operand::indexed(base, self.y)
            }
            Addressing::Relative => {
                let offset = self.fetch(bus) as i8;
                let target = self.pc.wrapping_add(offset as u16);
                Operand {
                    addr: target,
                    base: self.pc,
                    crossed: page_crossed(self.pc, target),
                }
            }
        }
    }
}

fn read_u16_zero_page<B: Bus>(bus: &mut B, ptr: u8) -> u16 {
    let lo = bus.read(ptr as u16) as u16;
    let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
    hi << 8 | lo
}

fn read_u16_same_page<B: Bus>(bus: &mut B, ptr: u16) -> u16 {
    let lo = bus.read(ptr) as u16;
    let hi = bus.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)) as u16;
    hi << 8 | lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::MockBus;

    fn cpu_at(bus: &mut MockBus) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.power_on(bus);
        cpu
    }

    #[test]
    fn indirect_jmp_wraps_inside_the_page() {
        let mut bus = MockBus::with_program(0x8000, &[0xFF, 0x10]);
        bus.mem[0x10FF] = 0x34;
        bus.mem[0x1000] = 0x12;
        bus.mem[0x1100] = 0x99;
        let mut cpu = cpu_at(&mut bus);
        let op = cpu.operand(&mut bus, Addressing::Indirect);
        assert_eq!(op.addr, 0x1234);
    }

    #[test]
    fn zero_page_pointers_wrap() {
        let mut bus = MockBus::with_program(0x8000, &[0xFF]);
        bus.mem[0x00FF] = 0xF0;
        bus.mem[0x0000] = 0x20;
        let mut cpu = cpu_at(&mut bus);
        cpu.y = 0x20;
        let op = cpu.operand(&mut bus, Addressing::IndirectY);
        assert_eq!(op.base, 0x20F0);
        assert_eq!(op.addr, 0x2110);
        assert!(op.crossed);
    }

    #[test]
    fn zero_page_index_stays_in_page_zero() {
        let mut bus = MockBus::with_program(0x8000, &[0xF0]);
        let mut cpu = cpu_at(&mut bus);
        cpu.x = 0x20;
        let op = cpu.operand(&mut bus, Addressing::ZeroPageX);
        assert_eq!(op.addr, 0x0010);
    }
}
