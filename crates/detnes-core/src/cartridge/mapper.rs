//! Cartridge bank-switching boards.
//!
//! The set of boards is closed: [`Mapper`] is an enum whose variants carry the
//! register file of one board each, and every operation is an exhaustive
//! match. ROM and RAM stay in the [`Cartridge`]; a board only decides which
//! offset of those memories an address lands on.
//!
//! | iNES | Board       | Variant            |
//! |------|-------------|--------------------|
//! | 0    | NROM        | [`Mapper::Nrom`]   |
//! | 1    | SxROM/MMC1  | [`Mapper::Mmc1`]   |
//! | 2    | UxROM       | [`Mapper::Uxrom`]  |
//! | 3    | CNROM       | [`Mapper::Cnrom`]  |
//! | 4    | TxROM/MMC3  | [`Mapper::Mmc3`]   |
//! | 7    | AxROM       | [`Mapper::Axrom`]  |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cartridge::{Cartridge, header::Mirroring},
    error::{LoadError, SerializationError},
    memory::cpu as cpu_mem,
};

pub mod axrom;
pub mod cnrom;
pub mod mmc1;
pub mod mmc3;
pub mod nrom;
pub mod uxrom;

pub use axrom::Axrom;
pub use cnrom::Cnrom;
pub use mmc1::Mmc1;
pub use mmc3::Mmc3;
pub use nrom::Nrom;
pub use uxrom::Uxrom;

/// Behaviour shared by every board.
///
/// CPU addresses passed in are in `$4020..=$FFFF`, PPU addresses in
/// `$0000..=$1FFF`.
pub trait Board {
    fn cpu_read(&self, cart: &Cartridge, addr: u16) -> u8;

    fn cpu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8);

    fn ppu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        cart.chr_byte(addr as usize & 0x1FFF)
    }

    fn ppu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8) {
        cart.write_chr(addr as usize & 0x1FFF, value);
    }

    fn mirroring(&self, cart: &Cartridge) -> Mirroring {
        cart.mirroring()
    }

    /// Called once per rendered scanline, at the point where the PPU starts
    /// fetching sprite patterns.
    fn on_scanline(&mut self) {}

    fn irq_pending(&self) -> bool {
        false
    }
}

/// Register state of the board plugged into the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mapper {
    Nrom(Nrom),
    Mmc1(Mmc1),
    Uxrom(Uxrom),
    Cnrom(Cnrom),
    Mmc3(Mmc3),
    Axrom(Axrom),
}

macro_rules! with_board {
    ($mapper:expr, $board:ident => $body:expr) => {
        match $mapper {
            Mapper::Nrom($board) => $body,
            Mapper::Mmc1($board) => $body,
            Mapper::Uxrom($board) => $body,
            Mapper::Cnrom($board) => $body,
            Mapper::Mmc3($board) => $body,
            Mapper::Axrom($board) => $body,
        }
    };
}

impl Mapper {
    /// Selects the board named by the cartridge header and validates that the
    /// ROM sizes are ones the board can address.
    pub fn new(cart: &Cartridge) -> Result<Self, LoadError> {
        let mapper = match cart.mapper_id() {
            0 => Mapper::Nrom(Nrom::new(cart)?),
            1 => Mapper::Mmc1(Mmc1::new(cart)?),
            2 => Mapper::Uxrom(Uxrom::new(cart)?),
            3 => Mapper::Cnrom(Cnrom::new(cart)?),
            4 => Mapper::Mmc3(Mmc3::new(cart)?),
            7 => Mapper::Axrom(Axrom::new(cart)?),
            mapper_id => return Err(LoadError::UnsupportedMapper { mapper_id }),
        };
        debug!(mapper = mapper.id(), "selected cartridge board");
        Ok(mapper)
    }

    pub fn id(&self) -> u16 {
        match self {
            Mapper::Nrom(_) => 0,
            Mapper::Mmc1(_) => 1,
            Mapper::Uxrom(_) => 2,
            Mapper::Cnrom(_) => 3,
            Mapper::Mmc3(_) => 4,
            Mapper::Axrom(_) => 7,
        }
    }

    pub fn cpu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        with_board!(self, board => board.cpu_read(cart, addr))
    }

    pub fn cpu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8) {
        with_board!(self, board => board.cpu_write(cart, addr, value))
    }

    pub fn ppu_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        with_board!(self, board => board.ppu_read(cart, addr))
    }

    pub fn ppu_write(&mut self, cart: &mut Cartridge, addr: u16, value: u8) {
        with_board!(self, board => board.ppu_write(cart, addr, value))
    }

    pub fn mirroring(&self, cart: &Cartridge) -> Mirroring {
        with_board!(self, board => board.mirroring(cart))
    }

    pub fn on_scanline(&mut self) {
        with_board!(self, board => board.on_scanline())
    }

    pub fn irq_pending(&self) -> bool {
        with_board!(self, board => board.irq_pending())
    }

    /// Replaces the register file with one restored from a snapshot. The
    /// snapshot must come from the same board.
    pub fn restore(&mut self, state: Mapper) -> Result<(), SerializationError> {
        if state.id() != self.id() {
            return Err(SerializationError::MapperMismatch {
                expected: self.id(),
                found: state.id(),
            });
        }
        *self = state;
        Ok(())
    }
}

/// Number of `bank_size` banks in `len` bytes, or an error when the ROM is
/// empty or not a whole number of banks.
pub(crate) fn bank_count(
    mapper: u16,
    section: &'static str,
    len: usize,
    bank_size: usize,
) -> Result<usize, LoadError> {
    if len == 0 || len % bank_size != 0 {
        return Err(LoadError::InvalidRomSize {
            mapper,
            section,
            size: len,
        });
    }
    Ok(len / bank_size)
}

/// Validates CHR sizing: RAM is always addressable, ROM must be whole banks.
pub(crate) fn chr_bank_count(
    mapper: u16,
    cart: &Cartridge,
    bank_size: usize,
) -> Result<usize, LoadError> {
    let len = cart.chr().len();
    if cart.chr().is_ram() {
        return Ok((len / bank_size).max(1));
    }
    bank_count(mapper, "CHR", len, bank_size)
}

/// Offset of `addr` within a `bank_size` window once `bank` is selected,
/// with the bank wrapped to `banks`.
#[inline]
pub(crate) fn banked(bank: usize, banks: usize, bank_size: usize, addr: u16) -> usize {
    (bank % banks.max(1)) * bank_size + (addr as usize & (bank_size - 1))
}

/// PRG RAM window shared by most boards.
#[inline]
pub(crate) fn is_prg_ram(addr: u16) -> bool {
    (cpu_mem::PRG_RAM_START..cpu_mem::PRG_ROM_START).contains(&addr)
}

/// Unmapped cartridge space floats; the last byte on the bus is usually the
/// high address byte.
#[inline]
pub(crate) fn open_bus(addr: u16) -> u8 {
    (addr >> 8) as u8
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_board_is_rejected_by_number() {
        let cart = test_support::cartridge(5, 0x8000, 0x2000);
        let err = Mapper::new(&cart).expect_err("mapper 5 is not implemented");
        assert!(matches!(err, LoadError::UnsupportedMapper { mapper_id: 5 }));
    }

    #[test]
    fn empty_prg_fails_construction() {
        let cart = test_support::cartridge(2, 0, 0);
        let err = Mapper::new(&cart).expect_err("no PRG");
        assert!(matches!(
            err,
            LoadError::InvalidRomSize {
                mapper: 2,
                section: "PRG",
                size: 0
            }
        ));
    }

    #[test]
    fn restore_requires_matching_board() {
        let cart = test_support::cartridge(2, 0x8000, 0);
        let mut mapper = Mapper::new(&cart).expect("uxrom");
        let foreign = Mapper::Cnrom(Cnrom::default());

        let err = mapper.restore(foreign).expect_err("board mismatch");
        assert!(matches!(
            err,
            SerializationError::MapperMismatch {
                expected: 2,
                found: 3
            }
        ));
    }
}
