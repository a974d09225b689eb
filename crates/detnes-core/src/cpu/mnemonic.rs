//! Instruction semantics, grouped the way the 6502 literature groups them.

use crate::{
    bus::Bus,
    cpu::{
        Cpu,
        addressing::{Addressing, Operand},
        status::Status,
    },
};

pub mod arith;
pub mod ctrl;
pub mod load;
pub mod logic;
pub mod shift;
pub mod stack;

/// Bits of A that survive the bus conflict in the unstable `XAA`/`LXA`
/// immediates. Real chips vary; this is the commonly observed value.
pub(crate) const MAGIC: u8 = 0xEE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Mnemonic {
    //Load/Store
    LAS,
    LAX,
    LDA,
    LDX,
    LDY,
    SAX,
    SHA,
    SHX,
    SHY,
    STA,
    STX,
    STY,
    //Transfer
    SHS,
    TAX,
    TAY,
    TSX,
    TXA,
    TXS,
    TYA,
    //Stack
    PHA,
    PHP,
    PLA,
    PLP,
    //Shift
    ASL,
    LSR,
    ROL,
    ROR,
    //Logic
    AND,
    BIT,
    EOR,
    ORA,
    //Arithmetic
    ADC,
    ANC,
    ARR,
    ASR,
    CMP,
    CPX,
    CPY,
    DCP,
    ISC,
    RLA,
    RRA,
    SBC,
    SBX,
    SLO,
    SRE,
    XAA,
    //Inc/Dec
    DEC,
    DEX,
    DEY,
    INC,
    INX,
    INY,
    //Control flow
    BRK,
    JMP,
    JSR,
    RTI,
    RTS,
    //Branch
    BCC,
    BCS,
    BEQ,
    BMI,
    BNE,
    BPL,
    BVC,
    BVS,
    //Flags
    CLC,
    CLD,
    CLI,
    CLV,
    SEC,
    SED,
    SEI,
    JAM,
    NOP,
}

impl Mnemonic {
    /// Instructions whose change to `I` only takes effect for IRQ polling
    /// after the next instruction.
    pub(crate) fn delays_irq_mask(self) -> bool {
        matches!(self, Mnemonic::CLI | Mnemonic::SEI | Mnemonic::PLP)
    }
}

impl Cpu {
    /// Runs one decoded instruction. Returns cycles beyond the table cost
    /// (only branches add any).
    pub(crate) fn dispatch<B: Bus>(
        &mut self,
        bus: &mut B,
        mnemonic: Mnemonic,
        mode: Addressing,
        op: Operand,
    ) -> u32 {
        let p = self.p;
        match mnemonic {
            Mnemonic::BCC => return self.branch(!p.contains(Status::CARRY), op),
            Mnemonic::BCS => return self.branch(p.contains(Status::CARRY), op),
            Mnemonic::BEQ => return self.branch(p.contains(Status::ZERO), op),
            Mnemonic::BMI => return self.branch(p.contains(Status::NEGATIVE), op),
            Mnemonic::BNE => return self.branch(!p.contains(Status::ZERO), op),
            Mnemonic::BPL => return self.branch(!p.contains(Status::NEGATIVE), op),
            Mnemonic::BVC => return self.branch(!p.contains(Status::OVERFLOW), op),
            Mnemonic::BVS => return self.branch(p.contains(Status::OVERFLOW), op),

            Mnemonic::LAS => self.las(bus, op),
            Mnemonic::LAX => self.lax(bus, mode, op),
            Mnemonic::LDA => self.a = self.load(bus, op),
            Mnemonic::LDX => self.x = self.load(bus, op),
            Mnemonic::LDY => self.y = self.load(bus, op),
            Mnemonic::SAX => bus.write(op.addr, self.a & self.x),
            Mnemonic::SHA => self.unstable_store(bus, op, self.a & self.x),
            Mnemonic::SHX => self.unstable_store(bus, op, self.x),
            Mnemonic::SHY => self.unstable_store(bus, op, self.y),
            Mnemonic::STA => bus.write(op.addr, self.a),
            Mnemonic::STX => bus.write(op.addr, self.x),
            Mnemonic::STY => bus.write(op.addr, self.y),

            Mnemonic::SHS => self.shs(bus, op),
            Mnemonic::TAX => self.x = self.transfer(self.a),
            Mnemonic::TAY => self.y = self.transfer(self.a),
            Mnemonic::TSX => self.x = self.transfer(self.s),
            Mnemonic::TXA => self.a = self.transfer(self.x),
            Mnemonic::TXS => self.s = self.x,
            Mnemonic::TYA => self.a = self.transfer(self.y),

            Mnemonic::PHA => self.push(bus, self.a),
            Mnemonic::PHP => self.push(bus, p.pushed(true)),
            Mnemonic::PLA => self.pla(bus),
            Mnemonic::PLP => self.p = Status::pulled(self.pop(bus)),

            Mnemonic::ASL => {
                self.modify(bus, mode, op, Cpu::asl);
            }
            Mnemonic::LSR => {
                self.modify(bus, mode, op, Cpu::lsr);
            }
            Mnemonic::ROL => {
                self.modify(bus, mode, op, Cpu::rol);
            }
            Mnemonic::ROR => {
                self.modify(bus, mode, op, Cpu::ror);
            }

            Mnemonic::AND => self.and(bus.read(op.addr)),
            Mnemonic::BIT => self.bit(bus, op),
            Mnemonic::EOR => self.eor(bus.read(op.addr)),
            Mnemonic::ORA => self.ora(bus.read(op.addr)),

            Mnemonic::ADC => self.adc(bus.read(op.addr)),
            Mnemonic::ANC => self.anc(bus.read(op.addr)),
            Mnemonic::ARR => self.arr(bus.read(op.addr)),
            Mnemonic::ASR => self.asr(bus.read(op.addr)),
            Mnemonic::CMP => self.compare(self.a, bus.read(op.addr)),
            Mnemonic::CPX => self.compare(self.x, bus.read(op.addr)),
            Mnemonic::CPY => self.compare(self.y, bus.read(op.addr)),
            Mnemonic::DCP => self.dcp(bus, op),
            Mnemonic::ISC => self.isc(bus, op),
            Mnemonic::RLA => self.rla(bus, op),
            Mnemonic::RRA => self.rra(bus, op),
            Mnemonic::SBC => self.sbc(bus.read(op.addr)),
            Mnemonic::SBX => self.sbx(bus.read(op.addr)),
            Mnemonic::SLO => self.slo(bus, op),
            Mnemonic::SRE => self.sre(bus, op),
            Mnemonic::XAA => self.xaa(bus.read(op.addr)),

            Mnemonic::DEC => {
                self.step_memory(bus, op, 0xFF);
            }
            Mnemonic::DEX => self.x = self.transfer(self.x.wrapping_sub(1)),
            Mnemonic::DEY => self.y = self.transfer(self.y.wrapping_sub(1)),
            Mnemonic::INC => {
                self.step_memory(bus, op, 0x01);
            }
            Mnemonic::INX => self.x = self.transfer(self.x.wrapping_add(1)),
            Mnemonic::INY => self.y = self.transfer(self.y.wrapping_add(1)),

            Mnemonic::BRK => self.brk(bus),
            Mnemonic::JMP => self.pc = op.addr,
            Mnemonic::JSR => self.jsr(bus, op),
            Mnemonic::RTI => self.rti(bus),
            Mnemonic::RTS => self.rts(bus),

            Mnemonic::CLC => self.p.remove(Status::CARRY),
            Mnemonic::CLD => self.p.remove(Status::DECIMAL),
            Mnemonic::CLI => self.p.remove(Status::INTERRUPT),
            Mnemonic::CLV => self.p.remove(Status::OVERFLOW),
            Mnemonic::SEC => self.p.insert(Status::CARRY),
            Mnemonic::SED => self.p.insert(Status::DECIMAL),
            Mnemonic::SEI => self.p.insert(Status::INTERRUPT),
            Mnemonic::JAM => self.jam(),
            Mnemonic::NOP => self.nop(bus, mode, op),
        }
        0
    }

    fn transfer(&mut self, value: u8) -> u8 {
        self.p.set_zn(value);
        value
    }
}
