use crate::{
    bus::PpuBus,
    cartridge::{Cartridge, Mapper, header::Mirroring},
};

/// PPU view of the cartridge, built fresh for every PPU call.
#[derive(Debug)]
pub struct ChrBus<'a> {
    cartridge: &'a mut Cartridge,
    mapper: &'a mut Mapper,
}

impl<'a> ChrBus<'a> {
    pub fn new(cartridge: &'a mut Cartridge, mapper: &'a mut Mapper) -> Self {
        Self { cartridge, mapper }
    }
}

impl PpuBus for ChrBus<'_> {
    fn read_pattern(&mut self, addr: u16) -> u8 {
        self.mapper.ppu_read(self.cartridge, addr)
    }

    fn write_pattern(&mut self, addr: u16, value: u8) {
        self.mapper.ppu_write(self.cartridge, addr, value);
    }

    fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring(self.cartridge)
    }

    fn scanline(&mut self) {
        self.mapper.on_scanline();
    }
}
