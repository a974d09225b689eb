//! Decode table for all 256 opcodes, documented and undocumented.

use crate::cpu::{addressing::Addressing as A, mnemonic::Mnemonic};

const IMP: A = A::Implied;
const ACC: A = A::Accumulator;
const IMM: A = A::Immediate;
const REL: A = A::Relative;
const ZP: A = A::ZeroPage;
const ZPX: A = A::ZeroPageX;
const ZPY: A = A::ZeroPageY;
const ABS: A = A::Absolute;
const ABX: A = A::AbsoluteX;
const ABY: A = A::AbsoluteY;
const IND: A = A::Indirect;
const INX: A = A::IndirectX;
const INY: A = A::IndirectY;

/// Base cost of an opcode and which penalty rule applies on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Cycle {
    Normal(u8),
    /// +1 when indexing crosses a page.
    Cross(u8),
    /// +1 when taken, +1 more when the target is on another page. Added by
    /// the branch itself.
    Branch(u8),
}

const fn n(cycle: u8) -> Cycle {
    Cycle::Normal(cycle)
}

const fn c(cycle: u8) -> Cycle {
    Cycle::Cross(cycle)
}

const fn b(cycle: u8) -> Cycle {
    Cycle::Branch(cycle)
}

impl Cycle {
    pub(crate) const fn total(self, crossed: bool) -> u32 {
        match self {
            Cycle::Cross(base) if crossed => base as u32 + 1,
            Cycle::Normal(base) | Cycle::Cross(base) | Cycle::Branch(base) => base as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Opcode {
    pub(crate) mnemonic: Mnemonic,
    pub(crate) mode: A,
    pub(crate) cycle: Cycle,
}

macro_rules! op {
    ($mnemonic:ident, $mode:ident, $cycle:expr) => {
        Opcode {
            mnemonic: Mnemonic::$mnemonic,
            mode: $mode,
            cycle: $cycle,
        }
    };
}

#[rustfmt::skip]
pub(crate) static LOOKUP_TABLE: [Opcode; 256] = [
    // 0x00
    op!(BRK, IMP, n(7)),     op!(ORA, INX, n(6)),     op!(JAM, IMP, n(2)),     op!(SLO, INX, n(8)),
    op!(NOP, ZP, n(3)),      op!(ORA, ZP, n(3)),      op!(ASL, ZP, n(5)),      op!(SLO, ZP, n(5)),
    op!(PHP, IMP, n(3)),     op!(ORA, IMM, n(2)),     op!(ASL, ACC, n(2)),     op!(ANC, IMM, n(2)),
    op!(NOP, ABS, n(4)),     op!(ORA, ABS, n(4)),     op!(ASL, ABS, n(6)),     op!(SLO, ABS, n(6)),

    // 0x10
    op!(BPL, REL, b(2)),     op!(ORA, INY, c(5)),     op!(JAM, IMP, n(2)),     op!(SLO, INY, n(8)),
    op!(NOP, ZPX, n(4)),     op!(ORA, ZPX, n(4)),     op!(ASL, ZPX, n(6)),     op!(SLO, ZPX, n(6)),
    op!(CLC, IMP, n(2)),     op!(ORA, ABY, c(4)),     op!(NOP, IMP, n(2)),     op!(SLO, ABY, n(7)),
    op!(NOP, ABX, c(4)),     op!(ORA, ABX, c(4)),     op!(ASL, ABX, n(7)),     op!(SLO, ABX, n(7)),

    // 0x20
    op!(JSR, ABS, n(6)),     op!(AND, INX, n(6)),     op!(JAM, IMP, n(2)),     op!(RLA, INX, n(8)),
    op!(BIT, ZP, n(3)),      op!(AND, ZP, n(3)),      op!(ROL, ZP, n(5)),      op!(RLA, ZP, n(5)),
    op!(PLP, IMP, n(4)),     op!(AND, IMM, n(2)),     op!(ROL, ACC, n(2)),     op!(ANC, IMM, n(2)),
    op!(BIT, ABS, n(4)),     op!(AND, ABS, n(4)),     op!(ROL, ABS, n(6)),     op!(RLA, ABS, n(6)),

    // 0x30
    op!(BMI, REL, b(2)),     op!(AND, INY, c(5)),     op!(JAM, IMP, n(2)),     op!(RLA, INY, n(8)),
    op!(NOP, ZPX, n(4)),     op!(AND, ZPX, n(4)),     op!(ROL, ZPX, n(6)),     op!(RLA, ZPX, n(6)),
    op!(SEC, IMP, n(2)),     op!(AND, ABY, c(4)),     op!(NOP, IMP, n(2)),     op!(RLA, ABY, n(7)),
    op!(NOP, ABX, c(4)),     op!(AND, ABX, c(4)),     op!(ROL, ABX, n(7)),     op!(RLA, ABX, n(7)),

    // 0x40
    op!(RTI, IMP, n(6)),     op!(EOR, INX, n(6)),     op!(JAM, IMP, n(2)),     op!(SRE, INX, n(8)),
    op!(NOP, ZP, n(3)),      op!(EOR, ZP, n(3)),      op!(LSR, ZP, n(5)),      op!(SRE, ZP, n(5)),
    op!(PHA, IMP, n(3)),     op!(EOR, IMM, n(2)),     op!(LSR, ACC, n(2)),     op!(ASR, IMM, n(2)),
    op!(JMP, ABS, n(3)),     op!(EOR, ABS, n(4)),     op!(LSR, ABS, n(6)),     op!(SRE, ABS, n(6)),

    // 0x50
    op!(BVC, REL, b(2)),     op!(EOR, INY, c(5)),     op!(JAM, IMP, n(2)),     op!(SRE, INY, n(8)),
    op!(NOP, ZPX, n(4)),     op!(EOR, ZPX, n(4)),     op!(LSR, ZPX, n(6)),     op!(SRE, ZPX, n(6)),
    op!(CLI, IMP, n(2)),     op!(EOR, ABY, c(4)),     op!(NOP, IMP, n(2)),     op!(SRE, ABY, n(7)),
    op!(NOP, ABX, c(4)),     op!(EOR, ABX, c(4)),     op!(LSR, ABX, n(7)),     op!(SRE, ABX, n(7)),

    // 0x60
    op!(RTS, IMP, n(6)),     op!(ADC, INX, n(6)),     op!(JAM, IMP, n(2)),     op!(RRA, INX, n(8)),
    op!(NOP, ZP, n(3)),      op!(ADC, ZP, n(3)),      op!(ROR, ZP, n(5)),      op!(RRA, ZP, n(5)),
    op!(PLA, IMP, n(4)),     op!(ADC, IMM, n(2)),     op!(ROR, ACC, n(2)),     op!(ARR, IMM, n(2)),
    op!(JMP, IND, n(5)),     op!(ADC, ABS, n(4)),     op!(ROR, ABS, n(6)),     op!(RRA, ABS, n(6)),

    // 0x70
    op!(BVS, REL, b(2)),     op!(ADC, INY, c(5)),     op!(JAM, IMP, n(2)),     op!(RRA, INY, n(8)),
    op!(NOP, ZPX, n(4)),     op!(ADC, ZPX, n(4)),     op!(ROR, ZPX, n(6)),     op!(RRA, ZPX, n(6)),
    op!(SEI, IMP, n(2)),     op!(ADC, ABY, c(4)),     op!(NOP, IMP, n(2)),     op!(RRA, ABY, n(7)),
    op!(NOP, ABX, c(4)),     op!(ADC, ABX, c(4)),     op!(ROR, ABX, n(7)),     op!(RRA, ABX, n(7)),

    // 0x80
    op!(NOP, IMM, n(2)),     op!(STA, INX, n(6)),     op!(NOP, IMM, n(2)),     op!(SAX, INX, n(6)),
    op!(STY, ZP, n(3)),      op!(STA, ZP, n(3)),      op!(STX, ZP, n(3)),      op!(SAX, ZP, n(3)),
    op!(DEY, IMP, n(2)),     op!(NOP, IMM, n(2)),     op!(TXA, IMP, n(2)),     op!(XAA, IMM, n(2)),
    op!(STY, ABS, n(4)),     op!(STA, ABS, n(4)),     op!(STX, ABS, n(4)),     op!(SAX, ABS, n(4)),

    // 0x90
    op!(BCC, REL, b(2)),     op!(STA, INY, n(6)),     op!(JAM, IMP, n(2)),     op!(SHA, INY, n(6)),
    op!(STY, ZPX, n(4)),     op!(STA, ZPX, n(4)),     op!(STX, ZPY, n(4)),     op!(SAX, ZPY, n(4)),
    op!(TYA, IMP, n(2)),     op!(STA, ABY, n(5)),     op!(TXS, IMP, n(2)),     op!(SHS, ABY, n(5)),
    op!(SHY, ABX, n(5)),     op!(STA, ABX, n(5)),     op!(SHX, ABY, n(5)),     op!(SHA, ABY, n(5)),

    // 0xA0
    op!(LDY, IMM, n(2)),     op!(LDA, INX, n(6)),     op!(LDX, IMM, n(2)),     op!(LAX, INX, n(6)),
    op!(LDY, ZP, n(3)),      op!(LDA, ZP, n(3)),      op!(LDX, ZP, n(3)),      op!(LAX, ZP, n(3)),
    op!(TAY, IMP, n(2)),     op!(LDA, IMM, n(2)),     op!(TAX, IMP, n(2)),     op!(LAX, IMM, n(2)),
    op!(LDY, ABS, n(4)),     op!(LDA, ABS, n(4)),     op!(LDX, ABS, n(4)),     op!(LAX, ABS, n(4)),

    // 0xB0
    op!(BCS, REL, b(2)),     op!(LDA, INY, c(5)),     op!(JAM, IMP, n(2)),     op!(LAX, INY, c(5)),
    op!(LDY, ZPX, n(4)),     op!(LDA, ZPX, n(4)),     op!(LDX, ZPY, n(4)),     op!(LAX, ZPY, n(4)),
    op!(CLV, IMP, n(2)),     op!(LDA, ABY, c(4)),     op!(TSX, IMP, n(2)),     op!(LAS, ABY, c(4)),
    op!(LDY, ABX, c(4)),     op!(LDA, ABX, c(4)),     op!(LDX, ABY, c(4)),     op!(LAX, ABY, c(4)),

    // 0xC0
    op!(CPY, IMM, n(2)),     op!(CMP, INX, n(6)),     op!(NOP, IMM, n(2)),     op!(DCP, INX, n(8)),
    op!(CPY, ZP, n(3)),      op!(CMP, ZP, n(3)),      op!(DEC, ZP, n(5)),      op!(DCP, ZP, n(5)),
    op!(INY, IMP, n(2)),     op!(CMP, IMM, n(2)),     op!(DEX, IMP, n(2)),     op!(SBX, IMM, n(2)),
    op!(CPY, ABS, n(4)),     op!(CMP, ABS, n(4)),     op!(DEC, ABS, n(6)),     op!(DCP, ABS, n(6)),

    // 0xD0
    op!(BNE, REL, b(2)),     op!(CMP, INY, c(5)),     op!(JAM, IMP, n(2)),     op!(DCP, INY, n(8)),
    op!(NOP, ZPX, n(4)),     op!(CMP, ZPX, n(4)),     op!(DEC, ZPX, n(6)),     op!(DCP, ZPX, n(6)),
    op!(CLD, IMP, n(2)),     op!(CMP, ABY, c(4)),     op!(NOP, IMP, n(2)),     op!(DCP, ABY, n(7)),
    op!(NOP, ABX, c(4)),     op!(CMP, ABX, c(4)),     op!(DEC, ABX, n(7)),     op!(DCP, ABX, n(7)),

    // 0xE0
    op!(CPX, IMM, n(2)),     op!(SBC, INX, n(6)),     op!(NOP, IMM, n(2)),     op!(ISC, INX, n(8)),
    op!(CPX, ZP, n(3)),      op!(SBC, ZP, n(3)),      op!(INC, ZP, n(5)),      op!(ISC, ZP, n(5)),
    op!(INX, IMP, n(2)),     op!(SBC, IMM, n(2)),     op!(NOP, IMP, n(2)),     op!(SBC, IMM, n(2)),
    op!(CPX, ABS, n(4)),     op!(SBC, ABS, n(4)),     op!(INC, ABS, n(6)),     op!(ISC, ABS, n(6)),

    // 0xF0
    op!(BEQ, REL, b(2)),     op!(SBC, INY, c(5)),     op!(JAM, IMP, n(2)),     op!(ISC, INY, n(8)),
    op!(NOP, ZPX, n(4)),     op!(SBC, ZPX, n(4)),     op!(INC, ZPX, n(6)),     op!(ISC, ZPX, n(6)),
    op!(SED, IMP, n(2)),     op!(SBC, ABY, c(4)),     op!(NOP, IMP, n(2)),     op!(ISC, ABY, n(7)),
    op!(NOP, ABX, c(4)),     op!(SBC, ABX, c(4)),     op!(INC, ABX, n(7)),     op!(ISC, ABX, n(7)),];
