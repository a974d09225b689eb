use crate::{bus::Bus, cpu::Cpu, memory::cpu::STACK_PAGE_START};

impl Cpu {
    pub(crate) fn push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        bus.write(STACK_PAGE_START | self.s as u16, value);
        self.s = self.s.wrapping_sub(1);
    }

    pub(crate) fn pop<B: Bus>(&mut self, bus: &mut B) -> u8 {
        self.s = self.s.wrapping_add(1);
        bus.read(STACK_PAGE_START | self.s as u16)
    }

    pub(crate) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    pub(crate) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pop(bus) as u16;
        let hi = self.pop(bus) as u16;
        hi << 8 | lo
    }

    pub(super) fn pla<B: Bus>(&mut self, bus: &mut B) {
        self.a = self.pop(bus);
        self.p.set_zn(self.a);
    }
}
