//! Memory capabilities handed to the processing units.
//!
//! Units never hold a reference back to the console. Instead the console
//! borrows its parts into a short-lived view that implements the capability a
//! unit needs ([`Bus`] for the CPU, [`PpuBus`] for the PPU) and passes it in
//! for the duration of one call.

use crate::cartridge::header::Mirroring;

pub mod chr;
pub mod cpu;
#[cfg(test)]
pub mod mock;

pub use chr::ChrBus;
pub use cpu::CpuBus;

/// What the CPU can see: a total 16 bit address space and the IRQ line.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;

    fn write(&mut self, addr: u16, value: u8);

    /// Level of the shared, active-high IRQ line (APU frame/DMC, mapper).
    fn irq_line(&mut self) -> bool {
        false
    }

    fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        hi << 8 | lo
    }
}

impl<T: Bus + ?Sized> Bus for &mut T {
    fn read(&mut self, addr: u16) -> u8 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        (**self).write(addr, value)
    }

    fn irq_line(&mut self) -> bool {
        (**self).irq_line()
    }
}

/// What the PPU can see outside its own RAM: the cartridge pattern space and
/// the board's nametable wiring.
pub trait PpuBus {
    /// Pattern table read, `addr` in `$0000-$1FFF`.
    fn read_pattern(&mut self, addr: u16) -> u8;

    fn write_pattern(&mut self, addr: u16, value: u8);

    fn mirroring(&self) -> Mirroring;

    /// Raised once per rendered line for boards that count scanlines.
    fn scanline(&mut self) {}
}
