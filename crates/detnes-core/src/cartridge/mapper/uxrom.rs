use serde::{Deserialize, Serialize};

use crate::{
    cartridge::{
        Cartridge,
        mapper::{Board, bank_count, banked, chr_bank_count, is_prg_ram, open_bus},
    },
    error::LoadError,
    memory::cpu as cpu_mem,
};

// Mapper 2 - UxROM, 16 KiB PRG switching.
//
// | Area | Address range | Behaviour                                |
// |------|---------------|------------------------------------------|
// | CPU  | `$8000-$BFFF` | switchable 16 KiB PRG bank               |
// | CPU  | `$C000-$FFFF` | fixed to the last 16 KiB PRG bank        |
// | CPU  | `$8000-$FFFF` | write: select the `$8000` bank           |
// | PPU  | `$0000-$1FFF` | 8 KiB CHR, usually RAM                   |

const PRG_BANK_SIZE: usize = 16 * 1024;
const FIXED_WINDOW_START: u16 = 0xC000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uxrom {
    bank: u8,
}

impl Uxrom {
    pub fn new(cart: &Cartridge) -> Result<Self, LoadError> {
        bank_count(2, "PRG", cart.prg_rom().len(), PRG_BANK_SIZE)?;
        chr_bank_count(2, cart, 8 * 1024)?;
        Ok(Self::default())
    }
}

impl Board for Uxrom {
    fn cpu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        let banks = cart.prg_rom().len() / PRG_BANK_SIZE;
        match addr {
            FIXED_WINDOW_START..=0xFFFF => {
                cart.prg_byte(banked(banks - 1, banks, PRG_BANK_SIZE, addr))
            }
            cpu_mem::PRG_ROM_START..FIXED_WINDOW_START => {
                cart.prg_byte(banked(self.bank as usize, banks, PRG_BANK_SIZE, addr))
            }
            _ if is_prg_ram(addr) => cart.read_prg_ram(addr),
            _ => open_bus(addr),
        }
    }

    fn cpu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8) {
        if addr >= cpu_mem::PRG_ROM_START {
            self.bank = value;
        } else if is_prg_ram(addr) {
            cart.write_prg_ram(addr, value);
        }
    }
}
