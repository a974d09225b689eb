//! Mapper 4 (MMC3 / TxROM).
//!
//! | Area | Address range | Behaviour                                            |
//! |------|---------------|------------------------------------------------------|
//! | CPU  | `$6000-$7FFF` | PRG RAM with enable and write-protect bits           |
//! | CPU  | `$8000-$9FFF` | 8 KiB PRG (R6 or second-last); bank select / data    |
//! | CPU  | `$A000-$BFFF` | 8 KiB PRG (R7); mirroring / RAM protect              |
//! | CPU  | `$C000-$DFFF` | 8 KiB PRG (second-last or R6); IRQ latch / reload    |
//! | CPU  | `$E000-$FFFF` | 8 KiB PRG fixed to the last bank; IRQ disable/enable |
//! | PPU  | `$0000-$1FFF` | 2x2 KiB + 4x1 KiB CHR, halves swappable              |
//!
//! The scanline counter is clocked once per rendered line. When it reaches
//! zero with IRQs enabled the IRQ line is held until `$E000` is written.

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

const PRG_BANK_SIZE: usize = 8 * 1024;
const CHR_BANK_SIZE: usize = 1024;

const PRG_MODE: u8 = 0x40;
const CHR_INVERT: u8 = 0x80;
const RAM_ENABLE: u8 = 0x80;
const RAM_WRITE_PROTECT: u8 = 0x40;

/// Register written at an even/odd address pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Register {
    BankSelect,
    BankData,
    Mirroring,
    RamProtect,
    IrqLatch,
    IrqReload,
    IrqDisable,
    IrqEnable,
}

impl Register {
    fn from_addr(addr: u16) -> Self {
        let odd = addr & 0x01 != 0;
        match (addr & 0xE000, odd) {
            (0x8000, false) => Register::BankSelect,
            (0x8000, true) => Register::BankData,
            (0xA000, false) => Register::Mirroring,
            (0xA000, true) => Register::RamProtect,
            (0xC000, false) => Register::IrqLatch,
            (0xC000, true) => Register::IrqReload,
            (_, false) => Register::IrqDisable,
            (_, true) => Register::IrqEnable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mmc3 {
    bank_select: u8,
    banks: [u8; 8],
    horizontal: bool,
    ram_control: u8,
    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_pending: bool,
}

impl Default for Mmc3 {
    fn default() -> Self {
        Self {
            bank_select: 0,
            banks: [0, 2, 4, 5, 6, 7, 0, 1],
            horizontal: false,
            ram_control: RAM_ENABLE,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
        }
    }
}

impl Mmc3 {
    pub fn new(cart: &Cartridge) -> Result<Self, LoadError> {
        bank_count(4, "PRG", cart.prg_rom().len(), PRG_BANK_SIZE)?;
        chr_bank_count(4, cart, CHR_BANK_SIZE)?;
        Ok(Self::default())
    }

    fn prg_offset(&self, cart: &Cartridge, addr: u16) -> usize {
        let banks = cart.prg_rom().len() / PRG_BANK_SIZE;
        let second_last = banks.saturating_sub(2);
        let r6 = (self.banks[6] & 0x3F) as usize;
        let r7 = (self.banks[7] & 0x3F) as usize;
        let swapped = self.bank_select & PRG_MODE != 0;
        let bank = match (addr - cpu_mem::PRG_ROM_START) / 0x2000 {
            0 if swapped => second_last,
            0 => r6,
            1 => r7,
            2 if swapped => r6,
            2 => second_last,
            _ => banks - 1,
        };
        banked(bank, banks, PRG_BANK_SIZE, addr)
    }

    fn chr_offset(&self, cart: &Cartridge, addr: u16) -> usize {
        let banks = (cart.chr().len() / CHR_BANK_SIZE).max(1);
        let addr = if self.bank_select & CHR_INVERT != 0 {
            addr ^ 0x1000
        } else {
            addr
        };
        let slot = (addr as usize & 0x1FFF) / CHR_BANK_SIZE;
        let bank = match slot {
            // 2 KiB banks ignore the low bit.
            0 => self.banks[0] & 0xFE,
            1 => self.banks[0] | 0x01,
            2 => self.banks[1] & 0xFE,
            3 => self.banks[1] | 0x01,
            n => self.banks[n - 2],
        };
        banked(bank as usize, banks, CHR_BANK_SIZE, addr)
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        match Register::from_addr(addr) {
            Register::BankSelect => self.bank_select = value,
            Register::BankData => self.banks[(self.bank_select & 0x07) as usize] = value,
            Register::Mirroring => self.horizontal = value & 0x01 != 0,
            Register::RamProtect => self.ram_control = value,
            Register::IrqLatch => self.irq_latch = value,
            Register::IrqReload => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            Register::IrqDisable => {
                self.irq_enabled = false;
                self.irq_pending = false;
            }
            Register::IrqEnable => self.irq_enabled = true,
        }
    }
}

impl Board for Mmc3 {
    fn cpu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        if addr >= cpu_mem::PRG_ROM_START {
            cart.prg_byte(self.prg_offset(cart, addr))
        } else if is_prg_ram(addr) && self.ram_control & RAM_ENABLE != 0 {
            cart.read_prg_ram(addr)
        } else {
            open_bus(addr)
        }
    }

    fn cpu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8) {
        if addr >= cpu_mem::PRG_ROM_START {
            self.write_register(addr, value);
        } else if is_prg_ram(addr)
            && self.ram_control & (RAM_ENABLE | RAM_WRITE_PROTECT) == RAM_ENABLE
        {
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

    fn mirroring(&self, cart: &Cartridge) -> Mirroring {
        match cart.mirroring() {
            Mirroring::FourScreen => Mirroring::FourScreen,
            _ if self.horizontal => Mirroring::Horizontal,
            _ => Mirroring::Vertical,
        }
    }

    fn on_scanline(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }

    fn irq_pending(&self) -> bool {
        self.irq_pending
    }
}
