use crate::{
    bus::Bus,
    cpu::{
        Cpu,
        addressing::{Addressing, Operand},
        mnemonic::MAGIC,
    },
};

impl Cpu {
    pub(super) fn load<B: Bus>(&mut self, bus: &mut B, op: Operand) -> u8 {
        let value = bus.read(op.addr);
        self.p.set_zn(value);
        value
    }

    /// `LAX`; the immediate form (`$AB`) is the unstable `LXA`.
    pub(super) fn lax<B: Bus>(&mut self, bus: &mut B, mode: Addressing, op: Operand) {
        let mut value = bus.read(op.addr);
        if mode == Addressing::Immediate {
            value &= self.a | MAGIC;
        }
        self.a = value;
        self.x = value;
        self.p.set_zn(value);
    }

    pub(super) fn las<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        let value = bus.read(op.addr) & self.s;
        self.a = value;
        self.x = value;
        self.s = value;
        self.p.set_zn(value);
    }

    /// `SHA`/`SHX`/`SHY`: the stored value is ANDed with the high byte of
    /// the base address plus one, and a page-crossing store lands on the
    /// page named by that value.
    pub(super) fn unstable_store<B: Bus>(&mut self, bus: &mut B, op: Operand, value: u8) {
        let high = ((op.base >> 8) as u8).wrapping_add(1);
        let value = value & high;
        let addr = if op.crossed {
            (value as u16) << 8 | (op.addr & 0x00FF)
        } else {
            op.addr
        };
        bus.write(addr, value);
    }

    /// `SHS` (`TAS`): S = A & X, then stored like `SHA`.
    pub(super) fn shs<B: Bus>(&mut self, bus: &mut B, op: Operand) {
        self.s = self.a & self.x;
        self.unstable_store(bus, op, self.s);
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::tests::run;

    #[test]
    fn lax_loads_both_registers() {
        // LAX $10
        let cpu = run(&[0xA7, 0x10], |bus| bus.mem[0x10] = 0x85, 1);
        assert_eq!((cpu.a(), cpu.x()), (0x85, 0x85));
        assert_eq!(cpu.p() & 0x80, 0x80);
    }

    #[test]
    fn lxa_mixes_accumulator_magic() {
        // LDA #$00; LXA #$FF
        let cpu = run(&[0xA9, 0x00, 0xAB, 0xFF], |_| {}, 2);
        assert_eq!((cpu.a(), cpu.x()), (0xEE, 0xEE));
    }

    #[test]
    fn sax_stores_a_and_x() {
        // LDA #$F0; LDX #$3C; SAX $20
        let (_, bus) = crate::cpu::tests::run_with_bus(
            &[0xA9, 0xF0, 0xA2, 0x3C, 0x87, 0x20],
            |_| {},
            3,
        );
        assert_eq!(bus.mem[0x20], 0x30);
    }

    #[test]
    fn shx_page_cross_redirects_the_store() {
        // LDX #$0F; LDY #$01; SHX $12FF,Y
        let (_, bus) = crate::cpu::tests::run_with_bus(
            &[0xA2, 0x0F, 0xA0, 0x01, 0x9E, 0xFF, 0x12],
            |_| {},
            3,
        );
        // $0F & $13 = $03, which also becomes the target page.
        assert_eq!(bus.mem[0x0300], 0x03);
        assert_eq!(bus.mem[0x1300], 0x00);
    }

    #[test]
    fn shy_without_cross_uses_the_effective_address() {
        // LDY #$FF; LDX #$01; SHY $1200,X
        let (_, bus) = crate::cpu::tests::run_with_bus(
            &[0xA0, 0xFF, 0xA2, 0x01, 0x9C, 0x00, 0x12],
            |_| {},
            3,
        );
        assert_eq!(bus.mem[0x1201], 0x13);
    }

    #[test]
    fn las_ands_with_stack_pointer() {
        // LAS $0300,Y with S = $FD after power on.
        let cpu = run(&[0xBB, 0x00, 0x03], |bus| bus.mem[0x0300] = 0x0F, 1);
        assert_eq!((cpu.a(), cpu.x(), cpu.s()), (0x0D, 0x0D, 0x0D));
    }
}
