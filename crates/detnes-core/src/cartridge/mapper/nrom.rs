use serde::{Deserialize, Serialize};

use crate::{
    cartridge::{
        Cartridge,
        mapper::{Board, bank_count, chr_bank_count, is_prg_ram, open_bus},
    },
    error::LoadError,
    memory::cpu as cpu_mem,
};

// Mapper 0 - NROM, no bank switching.
//
// | Area | Address range | Behaviour                                   |
// |------|---------------|---------------------------------------------|
// | CPU  | `$6000-$7FFF` | PRG RAM (Family BASIC style boards)          |
// | CPU  | `$8000-$FFFF` | 16 KiB PRG mirrored twice, or 32 KiB flat    |
// | PPU  | `$0000-$1FFF` | 8 KiB CHR ROM/RAM                            |

const PRG_BANK_SIZE: usize = 16 * 1024;
const CHR_BANK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nrom;

impl Nrom {
    pub fn new(cart: &Cartridge) -> Result<Self, LoadError> {
        let banks = bank_count(0, "PRG", cart.prg_rom().len(), PRG_BANK_SIZE)?;
        if banks > 2 {
            return Err(LoadError::InvalidRomSize {
                mapper: 0,
                section: "PRG",
                size: cart.prg_rom().len(),
            });
        }
        chr_bank_count(0, cart, CHR_BANK_SIZE)?;
        Ok(Nrom)
    }
}

impl Board for Nrom {
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
        if is_prg_ram(addr) {
            cart.write_prg_ram(addr, value);
        }
    }
}
