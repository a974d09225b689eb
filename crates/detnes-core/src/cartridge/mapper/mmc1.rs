//! Mapper 1 (MMC1 / SxROM).
//!
//! The CPU programs the chip one bit at a time: five writes to `$8000-$FFFF`
//! shift bit 0 into a 5 bit register, and the fifth write commits the value
//! to the internal register chosen by address bits 13-14. Writing a value
//! with bit 7 set aborts the sequence and forces PRG mode 3.
//!
//! | Area | Address range | Behaviour                                          |
//! |------|---------------|----------------------------------------------------|
//! | CPU  | `$6000-$7FFF` | PRG RAM, disabled by PRG register bit 4            |
//! | CPU  | `$8000-$FFFF` | two 16 KiB windows or one 32 KiB window            |
//! | PPU  | `$0000-$1FFF` | two 4 KiB windows or one 8 KiB window              |
//! | PPU  | `$2000-$3EFF` | mirroring from control bits 0-1                    |
//!
//! 512 KiB boards (SUROM) reuse bit 4 of the CHR registers to pick the PRG
//! half.

use serde::{Deserialize, Serialize};

use crate::{
    cartridge::{
        Cartridge,
        header::Mirroring,
        mapper::{Board, bank_count, banked, chr_bank_count, is_prg_ram, open_bus},
    },
    error::LoadError,
    memory::cpu as cpu_mem,
};

const PRG_BANK_SIZE: usize = 16 * 1024;
const CHR_BANK_SIZE: usize = 4 * 1024;
const SUROM_PRG_SIZE: usize = 512 * 1024;

/// Bit 4 marks "empty"; once it reaches bit 0 the register is full.
const SHIFT_EMPTY: u8 = 0x10;
const RESET_BIT: u8 = 0x80;
/// PRG mode 3: switch `$8000`, fix the last bank at `$C000`.
const CONTROL_POWER_ON: u8 = 0x0C;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mmc1 {
    shift: u8,
    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,
}

impl Default for Mmc1 {
    fn default() -> Self {
        Self {
            shift: SHIFT_EMPTY,
            control: CONTROL_POWER_ON,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
        }
    }
}

impl Mmc1 {
    pub fn new(cart: &Cartridge) -> Result<Self, LoadError> {
        bank_count(1, "PRG", cart.prg_rom().len(), PRG_BANK_SIZE)?;
        chr_bank_count(1, cart, CHR_BANK_SIZE)?;
        Ok(Self::default())
    }

    fn write_serial(&mut self, addr: u16, value: u8) {
        if value & RESET_BIT != 0 {
            self.shift = SHIFT_EMPTY;
            self.control |= CONTROL_POWER_ON;
            return;
        }

        let full = self.shift & 0x01 != 0;
        self.shift = (self.shift >> 1) | ((value & 0x01) << 4);
        if full {
            let data = self.shift & 0x1F;
            match (addr >> 13) & 0x03 {
                0 => self.control = data,
                1 => self.chr_bank0 = data,
                2 => self.chr_bank1 = data,
                _ => self.prg_bank = data,
            }
            self.shift = SHIFT_EMPTY;
        }
    }

    fn prg_ram_enabled(&self) -> bool {
        self.prg_bank & 0x10 == 0
    }

    /// 16 KiB bank visible at `addr`, before wrapping.
    fn prg_bank_at(&self, cart: &Cartridge, addr: u16) -> usize {
        let banks = cart.prg_rom().len() / PRG_BANK_SIZE;
        // SUROM: CHR bank 0 bit 4 selects the 256 KiB half.
        let (outer, banks_per_half) = if cart.prg_rom().len() == SUROM_PRG_SIZE {
            ((self.chr_bank0 as usize & 0x10) >> 4 << 4, 16)
        } else {
            (0, banks)
        };
        let bank = self.prg_bank as usize & 0x0F;
        let upper = addr >= 0xC000;
        let inner = match (self.control >> 2) & 0x03 {
            0 | 1 => (bank & !1) | upper as usize,
            2 if upper => bank,
            2 => 0,
            _ if upper => banks_per_half - 1,
            _ => bank,
        };
        outer + inner
    }

    fn chr_offset(&self, cart: &Cartridge, addr: u16) -> usize {
        let banks = (cart.chr().len() / CHR_BANK_SIZE).max(1);
        let upper = addr & 0x1000 != 0;
        let bank = if self.control & 0x10 == 0 {
            (self.chr_bank0 as usize & !1) | upper as usize
        } else if upper {
            self.chr_bank1 as usize
        } else {
            self.chr_bank0 as usize
        };
        banked(bank, banks, CHR_BANK_SIZE, addr)
    }
}

impl Board for Mmc1 {
    fn cpu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        if addr >= cpu_mem::PRG_ROM_START {
            let banks = cart.prg_rom().len() / PRG_BANK_SIZE;
            let bank = self.prg_bank_at(cart, addr);
            cart.prg_byte(banked(bank, banks, PRG_BANK_SIZE, addr))
        } else if is_prg_ram(addr) && self.prg_ram_enabled() {
            cart.read_prg_ram(addr)
        } else {
            open_bus(addr)
        }
    }

    fn cpu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8) {
        if addr >= cpu_mem::PRG_ROM_START {
            self.write_serial(addr, value);
        } else if is_prg_ram(addr) && self.prg_ram_enabled() {
            cart.write_prg_ram(addr, value);
        }
    }

    fn ppu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        cart.chr_byte(self.chr_offset(cart, addr))
    }

    fn ppu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8) {
        let offset = self.chr_offset(cart, addr);
        cart.write_chr(offset, value);
    }

    fn mirroring(&self, _cart: &Cartridge) -> Mirroring {
        match self.control & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mapper::test_support::cartridge;

    fn load(mmc1: &mut Mmc1, cart: &mut Cartridge, addr: u16, value: u8) {
        for bit in 0..5 {
            mmc1.cpu_write(cart, addr, (value >> bit) & 0x01);
        }
    }

    #[test]
    fn power_on_fixes_last_bank_high() {
        let cart = cartridge(1, 8 * PRG_BANK_SIZE, 0x2000);
        let mmc1 = Mmc1::new(&cart).expect("mmc1");
        assert_eq!(mmc1.cpu_read(&cart, 0x8000), 0);
        assert_eq!(mmc1.cpu_read(&cart, 0xC000), 14);
    }

    #[test]
    fn five_writes_commit_a_register() {
        let mut cart = cartridge(1, 8 * PRG_BANK_SIZE, 0x2000);
        let mut mmc1 = Mmc1::new(&cart).expect("mmc1");

        for bit in 0..4 {
            mmc1.cpu_write(&mut cart, 0xE000, (5 >> bit) & 1);
        }
        assert_eq!(mmc1.cpu_read(&cart, 0x8000), 0, "not committed yet");
        mmc1.cpu_write(&mut cart, 0xE000, 0);
        assert_eq!(mmc1.cpu_read(&cart, 0x8000), 10);
    }

    #[test]
    fn reset_bit_aborts_the_sequence() {
        let mut cart = cartridge(1, 8 * PRG_BANK_SIZE, 0x2000);
        let mut mmc1 = Mmc1::new(&cart).expect("mmc1");

        mmc1.cpu_write(&mut cart, 0xE000, 1);
        mmc1.cpu_write(&mut cart, 0xE000, 1);
        mmc1.cpu_write(&mut cart, 0x8000, RESET_BIT);
        load(&mut mmc1, &mut cart, 0xE000, 3);
        assert_eq!(mmc1.cpu_read(&cart, 0x8000), 6);
    }

    #[test]
    fn thirty_two_kib_mode_ignores_low_bit() {
        let mut cart = cartridge(1, 8 * PRG_BANK_SIZE, 0x2000);
        let mut mmc1 = Mmc1::new(&cart).expect("mmc1");

        load(&mut mmc1, &mut cart, 0x8000, 0x00);
        load(&mut mmc1, &mut cart, 0xE000, 3);
        assert_eq!(mmc1.cpu_read(&cart, 0x8000), 4);
        assert_eq!(mmc1.cpu_read(&cart, 0xC000), 6);
        assert_eq!(mmc1.mirroring(&cart), Mirroring::SingleScreenLower);
    }

    #[test]
    fn four_kib_chr_windows() {
        let mut cart = cartridge(1, 2 * PRG_BANK_SIZE, 8 * CHR_BANK_SIZE);
        let mut mmc1 = Mmc1::new(&cart).expect("mmc1");

        load(&mut mmc1, &mut cart, 0x8000, 0x10 | 0x02);
        load(&mut mmc1, &mut cart, 0xA000, 3);
        load(&mut mmc1, &mut cart, 0xC000, 6);
        assert_eq!(mmc1.ppu_read(&cart, 0x0000), 12);
        assert_eq!(mmc1.ppu_read(&cart, 0x1000), 24);
        assert_eq!(mmc1.mirroring(&cart), Mirroring::Vertical);
    }

    #[test]
    fn prg_ram_disable_bit() {
        let mut cart = cartridge(1, 2 * PRG_BANK_SIZE, 0x2000);
        let mut mmc1 = Mmc1::new(&cart).expect("mmc1");

        mmc1.cpu_write(&mut cart, 0x6000, 0x42);
        assert_eq!(mmc1.cpu_read(&cart, 0x6000), 0x42);
        load(&mut mmc1, &mut cart, 0xE000, 0x10);
        assert_eq!(mmc1.cpu_read(&cart, 0x6000), open_bus(0x6000));
    }
}
