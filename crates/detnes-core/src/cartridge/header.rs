//! iNES / NES 2.0 header decoding.
//!
//! Every cartridge image starts with a 16 byte header describing the PRG/CHR
//! section sizes, the board (mapper) number and a handful of wiring flags.
//! [`Header::parse`] accepts both the classic iNES layout and the extended
//! NES 2.0 layout and rejects the pre-iNES "archaic" variant outright rather
//! than guessing at its garbage bytes.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

const NES_MAGIC: &[u8; 4] = b"NES\x1A";

/// Size of the fixed iNES header in bytes.
pub const NES_HEADER_LEN: usize = 16;

pub const PRG_UNIT: usize = 16 * 1024;
pub const CHR_UNIT: usize = 8 * 1024;
/// Largest PRG or CHR RAM a header can declare: a volatile and a
/// battery-backed area of up to `64 << 15` bytes each.
pub const MAX_RAM_SIZE: usize = 2 * (64 << 15);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags6: u8 {
        const VERTICAL        = 0b0000_0001;
        const BATTERY         = 0b0000_0010;
        const TRAINER         = 0b0000_0100;
        const FOUR_SCREEN     = 0b0000_1000;
        const MAPPER_LOW      = 0b1111_0000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags7: u8 {
        const CONSOLE_TYPE    = 0b0000_0011;
        const FORMAT          = 0b0000_1100;
        const MAPPER_HIGH     = 0b1111_0000;
    }
}

/// Nametable arrangement seen by the PPU.
///
/// The header only ever produces the first three variants; the single screen
/// variants are selected at run time by boards such as MMC1 and AxROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
    SingleScreenLower,
    SingleScreenUpper,
}

impl Mirroring {
    /// Physical 1 KiB nametable page used for logical table `table` (0..=3).
    pub fn page(self, table: u16) -> u16 {
        let table = table & 0x03;
        match self {
            Mirroring::Horizontal => table >> 1,
            Mirroring::Vertical => table & 0x01,
            Mirroring::FourScreen => table,
            Mirroring::SingleScreenLower => 0,
            Mirroring::SingleScreenUpper => 1,
        }
    }
}

/// Header flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RomFormat {
    INes,
    Nes20,
    Archaic,
}

impl RomFormat {
    fn detect(flags7: Flags7) -> Self {
        match (flags7 & Flags7::FORMAT).bits() >> 2 {
            0b10 => RomFormat::Nes20,
            0b00 => RomFormat::INes,
            _ => RomFormat::Archaic,
        }
    }
}

/// Timing the dump says it was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TvSystem {
    Ntsc,
    Pal,
    /// Runs on either timing.
    Dual,
    Dendy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub format: RomFormat,
    pub mapper: u16,
    pub submapper: u8,
    pub mirroring: Mirroring,
    pub battery: bool,
    pub trainer: bool,
    pub prg_rom_size: usize,
    pub chr_rom_size: usize,
    /// PRG RAM at $6000-$7FFF, volatile plus battery backed.
    pub prg_ram_size: usize,
    /// CHR RAM used when the cartridge ships without CHR ROM.
    pub chr_ram_size: usize,
    pub tv_system: TvSystem,
}

impl Header {
    pub fn parse(bytes: &[u8]) -> Result<Self, LoadError> {
        let Some(bytes) = bytes.get(..NES_HEADER_LEN) else {
            return Err(LoadError::TooShort {
                actual: bytes.len(),
            });
        };
        if &bytes[..4] != NES_MAGIC {
            return Err(LoadError::InvalidMagic);
        }

        let flags6 = Flags6::from_bits_truncate(bytes[6]);
        let flags7 = Flags7::from_bits_truncate(bytes[7]);
        match RomFormat::detect(flags7) {
            RomFormat::INes => Ok(Self::parse_ines(bytes, flags6, flags7)),
            RomFormat::Nes20 => Ok(Self::parse_nes20(bytes, flags6, flags7)),
            format @ RomFormat::Archaic => Err(LoadError::UnsupportedFormat(format)),
        }
    }

    fn parse_ines(bytes: &[u8], flags6: Flags6, flags7: Flags7) -> Self {
        let chr_rom_size = bytes[5] as usize * CHR_UNIT;
        Self {
            format: RomFormat::INes,
            mapper: mapper_number(flags6, flags7, 0),
            submapper: 0,
            mirroring: mirroring(flags6),
            battery: flags6.contains(Flags6::BATTERY),
            trainer: flags6.contains(Flags6::TRAINER),
            prg_rom_size: bytes[4] as usize * PRG_UNIT,
            chr_rom_size,
            // A zero here means "assume one 8 KiB bank".
            prg_ram_size: bytes[8].max(1) as usize * 8 * 1024,
            chr_ram_size: if chr_rom_size == 0 { CHR_UNIT } else { 0 },
            tv_system: if bytes[9] & 0x01 == 0 {
                TvSystem::Ntsc
            } else {
                TvSystem::Pal
            },
        }
    }

    fn parse_nes20(bytes: &[u8], flags6: Flags6, flags7: Flags7) -> Self {
        let prg_rom_size = nes20_rom_size(bytes[4], bytes[9] & 0x0F, PRG_UNIT);
        let chr_rom_size = nes20_rom_size(bytes[5], bytes[9] >> 4, CHR_UNIT);
        let prg_ram_size = nes20_ram_size(bytes[10] & 0x0F) + nes20_ram_size(bytes[10] >> 4);
        let chr_ram_size = nes20_ram_size(bytes[11] & 0x0F) + nes20_ram_size(bytes[11] >> 4);

        Self {
            format: RomFormat::Nes20,
            mapper: mapper_number(flags6, flags7, bytes[8] & 0x0F),
            submapper: bytes[8] >> 4,
            mirroring: mirroring(flags6),
            battery: flags6.contains(Flags6::BATTERY) || bytes[10] >> 4 != 0,
            trainer: flags6.contains(Flags6::TRAINER),
            prg_rom_size,
            chr_rom_size,
            prg_ram_size,
            chr_ram_size: if chr_rom_size == 0 {
                chr_ram_size.max(CHR_UNIT)
            } else {
                chr_ram_size
            },
            tv_system: match bytes[12] & 0x03 {
                0 => TvSystem::Ntsc,
                1 => TvSystem::Pal,
                2 => TvSystem::Dual,
                _ => TvSystem::Dendy,
            },
        }
    }
}

fn mirroring(flags6: Flags6) -> Mirroring {
    if flags6.contains(Flags6::FOUR_SCREEN) {
        Mirroring::FourScreen
    } else if flags6.contains(Flags6::VERTICAL) {
        Mirroring::Vertical
    } else {
        Mirroring::Horizontal
    }
}

fn mapper_number(flags6: Flags6, flags7: Flags7, nes20_bits: u8) -> u16 {
    let low = (flags6 & Flags6::MAPPER_LOW).bits() as u16 >> 4;
    let mid = (flags7 & Flags7::MAPPER_HIGH).bits() as u16;
    low | mid | (nes20_bits as u16) << 8
}

fn nes20_rom_size(lsb: u8, msb_nibble: u8, unit: usize) -> usize {
    if msb_nibble == 0x0F {
        // Exponent-multiplier form: 2^E * (MM * 2 + 1).
        let exponent = (lsb >> 2) as u32;
        let multiplier = ((lsb & 0x03) as usize) * 2 + 1;
        1usize
            .checked_shl(exponent)
            .map_or(usize::MAX, |base| base.saturating_mul(multiplier))
    } else {
        ((msb_nibble as usize) << 8 | lsb as usize) * unit
    }
}

fn nes20_ram_size(shift: u8) -> usize {
    if shift == 0 { 0 } else { 64 << shift }
}
