use crate::{
    apu::Apu,
    bus::{Bus, ChrBus},
    cartridge::{Cartridge, Mapper, mapper},
    controller::Controller,
    memory::cpu as cpu_mem,
    ppu::Ppu,
};

/// CPU view of the console: work RAM, the PPU and APU register files, the
/// controller ports and the cartridge. It borrows the hardware from the
/// owning console for a single instruction.
#[derive(Debug)]
pub struct CpuBus<'a> {
    ram: &'a mut [u8; cpu_mem::INTERNAL_RAM_SIZE],
    ppu: &'a mut Ppu,
    apu: &'a mut Apu,
    cartridge: &'a mut Cartridge,
    mapper: &'a mut Mapper,
    controllers: &'a mut [Controller; 2],
    /// Page latched by a `$4014` write; the console performs the copy once
    /// the instruction has finished.
    oam_dma: &'a mut Option<u8>,
}

impl<'a> CpuBus<'a> {
    pub(crate) fn new(
        ram: &'a mut [u8; cpu_mem::INTERNAL_RAM_SIZE],
        ppu: &'a mut Ppu,
        apu: &'a mut Apu,
        cartridge: &'a mut Cartridge,
        mapper: &'a mut Mapper,
        controllers: &'a mut [Controller; 2],
        oam_dma: &'a mut Option<u8>,
    ) -> Self {
        Self {
            ram,
            ppu,
            apu,
            cartridge,
            mapper,
            controllers,
            oam_dma,
        }
    }
}

impl Bus for CpuBus<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=cpu_mem::INTERNAL_RAM_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                let mut chr = ChrBus::new(self.cartridge, self.mapper);
                self.ppu.read_register(addr, &mut chr)
            }
            cpu_mem::APU_STATUS => self.apu.read_status(),
            cpu_mem::CONTROLLER_PORT_1 => self.controllers[0].read(),
            cpu_mem::CONTROLLER_PORT_2 => self.controllers[1].read(),
            cpu_mem::CARTRIDGE_SPACE_BASE..=0xFFFF => self.mapper.cpu_read(self.cartridge, addr),
            // Write-only APU registers, $4014 and the disabled test range.
            _ => mapper::open_bus(addr),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=cpu_mem::INTERNAL_RAM_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize] = value;
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                let mut chr = ChrBus::new(self.cartridge, self.mapper);
                self.ppu.write_register(addr, value, &mut chr);
            }
            cpu_mem::OAM_DMA => *self.oam_dma = Some(value),
            cpu_mem::CONTROLLER_PORT_1 => {
                for pad in self.controllers.iter_mut() {
                    pad.write_strobe(value);
                }
            }
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_REGISTER_END
            | cpu_mem::APU_STATUS
            | cpu_mem::CONTROLLER_PORT_2 => self.apu.write_register(addr, value),
            cpu_mem::CARTRIDGE_SPACE_BASE..=0xFFFF => {
                self.mapper.cpu_write(self.cartridge, addr, value);
            }
            _ => {}
        }
    }

    fn irq_line(&mut self) -> bool {
        self.apu.irq_pending() || self.mapper.irq_pending()
    }
}
