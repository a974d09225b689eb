use std::{fs, path::Path};

use tracing::debug;

use crate::{
    cartridge::header::{Header, Mirroring, NES_HEADER_LEN, TvSystem},
    error::LoadError,
};

pub mod chr;
pub mod header;
pub mod mapper;

pub use chr::ChrMemory;
pub use mapper::{Board, Mapper};

pub const TRAINER_SIZE: usize = 512;
pub const PRG_RAM_WINDOW: usize = 0x2000;

/// Cartridge contents: immutable ROM images plus the RAM chips on the board.
///
/// The mapper registers live in [`Mapper`]; the cartridge itself only knows
/// how to resolve absolute offsets into its memories, wrapping every offset
/// to the real size of the chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    mapper_id: u16,
    submapper: u8,
    mirroring: Mirroring,
    battery: bool,
    tv_system: TvSystem,
    prg_rom: Box<[u8]>,
    chr: ChrMemory,
    prg_ram: Box<[u8]>,
}

/// Everything needed to rebuild a cartridge, as recorded in the static blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardInfo {
    pub mapper_id: u16,
    pub submapper: u8,
    pub mirroring: Mirroring,
    pub battery: bool,
    pub tv_system: TvSystem,
    pub prg_ram_size: usize,
    pub chr_ram_size: usize,
}

impl From<&Header> for BoardInfo {
    fn from(header: &Header) -> Self {
        Self {
            mapper_id: header.mapper,
            submapper: header.submapper,
            mirroring: header.mirroring,
            battery: header.battery,
            tv_system: header.tv_system,
            prg_ram_size: header.prg_ram_size,
            chr_ram_size: header.chr_ram_size,
        }
    }
}

impl Cartridge {
    pub fn new(info: BoardInfo, prg_rom: Box<[u8]>, chr_rom: Box<[u8]>) -> Self {
        // Boards always decode the full 8 KiB window at $6000.
        let prg_ram_size = info.prg_ram_size.max(PRG_RAM_WINDOW);
        Self {
            mapper_id: info.mapper_id,
            submapper: info.submapper,
            mirroring: info.mirroring,
            battery: info.battery,
            tv_system: info.tv_system,
            prg_rom,
            chr: ChrMemory::new(chr_rom, info.chr_ram_size),
            prg_ram: vec![0; prg_ram_size].into_boxed_slice(),
        }
    }

    pub fn info(&self) -> BoardInfo {
        BoardInfo {
            mapper_id: self.mapper_id,
            submapper: self.submapper,
            mirroring: self.mirroring,
            battery: self.battery,
            tv_system: self.tv_system,
            prg_ram_size: self.prg_ram.len(),
            chr_ram_size: self.chr.ram().len(),
        }
    }

    pub fn mapper_id(&self) -> u16 {
        self.mapper_id
    }

    /// Hard-wired nametable arrangement from the header.
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn has_battery(&self) -> bool {
        self.battery
    }

    pub fn tv_system(&self) -> TvSystem {
        self.tv_system
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    pub fn chr(&self) -> &ChrMemory {
        &self.chr
    }

    pub fn prg_ram(&self) -> &[u8] {
        &self.prg_ram
    }

    pub(crate) fn prg_ram_mut(&mut self) -> &mut [u8] {
        &mut self.prg_ram
    }

    pub(crate) fn chr_ram_mut(&mut self) -> Option<&mut [u8]> {
        self.chr.ram_mut()
    }

    pub fn prg_byte(&self, offset: usize) -> u8 {
        match self.prg_rom.len() {
            0 => 0,
            len => self.prg_rom[offset % len],
        }
    }

    pub fn chr_byte(&self, offset: usize) -> u8 {
        self.chr.read(offset)
    }

    pub fn write_chr(&mut self, offset: usize, value: u8) {
        self.chr.write(offset, value);
    }

    pub fn read_prg_ram(&self, addr: u16) -> u8 {
        self.prg_ram[addr as usize % self.prg_ram.len()]
    }

    pub fn write_prg_ram(&mut self, addr: u16, value: u8) {
        let len = self.prg_ram.len();
        self.prg_ram[addr as usize % len] = value;
    }

    /// Battery-backed RAM for hosts that persist saves, `None` without a battery.
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.battery.then_some(&*self.prg_ram)
    }

    /// Restores persisted battery RAM. Extra bytes are ignored, missing ones stay zero.
    pub fn load_battery_ram(&mut self, data: &[u8]) {
        if !self.battery {
            return;
        }
        let len = data.len().min(self.prg_ram.len());
        self.prg_ram[..len].copy_from_slice(&data[..len]);
    }
}

/// Load a cartridge from an in-memory iNES image.
pub fn load_cartridge(bytes: &[u8]) -> Result<Cartridge, LoadError> {
    let header = Header::parse(bytes)?;
    let mut cursor = NES_HEADER_LEN;
    if header.trainer {
        // The trainer targets $7000 on copier hardware; nothing maps it here.
        section(bytes, &mut cursor, TRAINER_SIZE, "trainer")?;
    }
    let prg_rom = section(bytes, &mut cursor, header.prg_rom_size, "PRG ROM")?;
    let chr_rom = section(bytes, &mut cursor, header.chr_rom_size, "CHR ROM")?;
    debug!(
        mapper = header.mapper,
        prg = prg_rom.len(),
        chr = chr_rom.len(),
        mirroring = ?header.mirroring,
        "parsed cartridge image"
    );

    Ok(Cartridge::new(
        BoardInfo::from(&header),
        prg_rom.into(),
        chr_rom.into(),
    ))
}

/// Load a cartridge directly from disk.
pub fn load_cartridge_from_file<P>(path: P) -> Result<Cartridge, LoadError>
where
    P: AsRef<Path>,
{
    let bytes = fs::read(path)?;
    load_cartridge(&bytes)
}

fn section<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    len: usize,
    name: &'static str,
) -> Result<&'a [u8], LoadError> {
    let too_short = || LoadError::SectionTooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    };
    let end = cursor.checked_add(len).ok_or_else(too_short)?;
    let slice = bytes.get(*cursor..end).ok_or_else(too_short)?;
    *cursor = end;
    Ok(slice)
}
