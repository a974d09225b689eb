use serde::{Deserialize, Serialize};

use crate::{
    cartridge::{
        Cartridge,
        header::Mirroring,
        mapper::{Board, bank_count, banked, chr_bank_count, open_bus},
    },
    error::LoadError,
    memory::cpu as cpu_mem,
};

// Mapper 7 - AxROM, 32 KiB PRG switching with single-screen mirroring.
//
// | Area | Address range | Behaviour                                        |
// |------|---------------|--------------------------------------------------|
// | CPU  | `$8000-$FFFF` | switchable 32 KiB PRG bank                       |
// | CPU  | `$8000-$FFFF` | write: bits 0-2 PRG bank, bit 4 nametable page   |
// | PPU  | `$0000-$1FFF` | 8 KiB CHR RAM                                    |
// | PPU  | `$2000-$3EFF` | single-screen, page picked by bit 4              |

const PRG_BANK_SIZE: usize = 32 * 1024;
const BANK_MASK: u8 = 0x07;
const PAGE_SELECT: u8 = 0x10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axrom {
    bank: u8,
    upper_page: bool,
}

impl Axrom {
    pub fn new(cart: &Cartridge) -> Result<Self, LoadError> {
        bank_count(7, "PRG", cart.prg_rom().len(), PRG_BANK_SIZE)?;
        chr_bank_count(7, cart, 8 * 1024)?;
        Ok(Self::default())
    }
}

impl Board for Axrom {
    fn cpu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        if addr < cpu_mem::PRG_ROM_START {
            return open_bus(addr);
        }
        let banks = cart.prg_rom().len() / PRG_BANK_SIZE;
        cart.prg_byte(banked(self.bank as usize, banks, PRG_BANK_SIZE, addr))
    }

    fn cpu_write(&mut self, _cart: &mut Cartridge, addr: u16, value: u8) {
        if addr >= cpu_mem::PRG_ROM_START {
            self.bank = value & BANK_MASK;
            self.upper_page = value & PAGE_SELECT != 0;
        }
    }

    fn mirroring(&self, _cart: &Cartridge) -> Mirroring {
        if self.upper_page {
            Mirroring::SingleScreenUpper
        } else {
            Mirroring::SingleScreenLower
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mapper::test_support::cartridge;

    #[test]
    fn switches_whole_prg_and_nametable_page() {
        let mut cart = cartridge(7, 4 * PRG_BANK_SIZE, 0);
        let mut axrom = Axrom::new(&cart).expect("axrom");

        assert_eq!(axrom.mirroring(&cart), Mirroring::SingleScreenLower);
        axrom.cpu_write(&mut cart, 0x8000, PAGE_SELECT | 2);

        assert_eq!(axrom.cpu_read(&cart, 0x8000), 8);
        assert_eq!(axrom.cpu_read(&cart, 0xE000), 11);
        assert_eq!(axrom.mirroring(&cart), Mirroring::SingleScreenUpper);
    }
}
