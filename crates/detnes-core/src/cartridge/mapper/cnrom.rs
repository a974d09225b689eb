use serde::{Deserialize, Serialize};

use crate::{
    cartridge::{
        Cartridge,
        mapper::{Board, bank_count, banked, chr_bank_count, is_prg_ram, open_bus},
    },
    error::LoadError,
    memory::cpu as cpu_mem,
};

// Mapper 3 - CNROM, 8 KiB CHR switching with fixed PRG.
//
// | Area | Address range | Behaviour                              |
// |------|---------------|----------------------------------------|
// | CPU  | `$8000-$FFFF` | 16/32 KiB PRG, like NROM               |
// | CPU  | `$8000-$FFFF` | write: select the 8 KiB CHR bank       |
// | PPU  | `$0000-$1FFF` | switchable 8 KiB CHR bank              |

const PRG_BANK_SIZE: usize = 16 * 1024;
const CHR_BANK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cnrom {
    chr_bank: u8,
}

impl Cnrom {
    pub fn new(cart: &Cartridge) -> Result<Self, LoadError> {
        let banks = bank_count(3, "PRG", cart.prg_rom().len(), PRG_BANK_SIZE)?;
        if banks > 2 {
            return Err(LoadError::InvalidRomSize {
                mapper: 3,
                section: "PRG",
                size: cart.prg_rom().len(),
            });
        }
        chr_bank_count(3, cart, CHR_BANK_SIZE)?;
        Ok(Self::default())
    }
}

impl Board for Cnrom {
    fn cpu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        if addr >= cpu_mem::PRG_ROM_START {
            cart.prg_byte((addr - cpu_mem::PRG_ROM_START) as usize)
        } else if is_prg_ram(addr) {
            cart.read_prg_ram(addr)
        } else {
            open_bus(addr)
        }
    }

    fn cpu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8) {
        if addr >= cpu_mem::PRG_ROM_START {
            self.chr_bank = value;
        } else if is_prg_ram(addr) {
            cart.write_prg_ram(addr, value);
        }
    }

    fn ppu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        let banks = cart.chr().len() / CHR_BANK_SIZE;
        cart.chr_byte(banked(self.chr_bank as usize, banks, CHR_BANK_SIZE, addr))
    }

    fn ppu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8) {
        let banks = cart.chr().len() / CHR_BANK_SIZE;
        cart.write_chr(
            banked(self.chr_bank as usize, banks, CHR_BANK_SIZE, addr),
            value,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mapper::test_support::cartridge;

    #[test]
    fn selects_chr_bank() {
        let mut cart = cartridge(3, 0x8000, 4 * CHR_BANK_SIZE);
        let mut cnrom = Cnrom::new(&cart).expect("cnrom");

        assert_eq!(cnrom.ppu_read(&cart, 0x0000), 0);
        cnrom.cpu_write(&mut cart, 0x8000, 3);
        // Bank 3 starts at 1 KiB page 24.
        assert_eq!(cnrom.ppu_read(&cart, 0x0000), 24);
        assert_eq!(cnrom.ppu_read(&cart, 0x1C00), 31);

        cnrom.cpu_write(&mut cart, 0x8000, 5);
        assert_eq!(cnrom.ppu_read(&cart, 0x0000), 8);
    }

    #[test]
    fn partial_chr_bank_fails_construction() {
        let cart = cartridge(3, 0x8000, 0x3000);
        assert!(matches!(
            Cnrom::new(&cart),
            Err(LoadError::InvalidRomSize {
                section: "CHR",
                ..
            })
        ));
    }
}
