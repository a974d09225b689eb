//! Split state blobs.
//!
//! A console is checkpointed as two independent byte strings:
//!
//! * the **static** blob holds what the cartridge image determines (board,
//!   wiring, region, ROM contents). It never changes while the machine runs,
//!   so identical cartridges always encode to identical bytes and the blob can
//!   be content addressed and shared between checkpoints;
//! * the **dynamic** blob holds everything that `step` mutates.
//!
//! Both use the same envelope: a four byte magic tag, a little-endian `u16`
//! format version, then a `postcard` payload that must consume every
//! remaining byte.

use serde::{Deserialize, Serialize};

use crate::{
    apu::Apu,
    cartridge::{
        BoardInfo, Mapper,
        header::{MAX_RAM_SIZE, Mirroring, TvSystem},
    },
    config::Region,
    controller::Controller,
    cpu::Cpu,
    error::{Blob, SerializationError},
    ppu::Ppu,
};

pub const STATIC_MAGIC: [u8; 4] = *b"DNST";
pub const DYNAMIC_MAGIC: [u8; 4] = *b"DNDY";
/// Bumped whenever a serialized struct changes shape.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = 6;

/// Cartridge-derived part of the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StaticState<'a> {
    pub mapper_id: u16,
    pub submapper: u8,
    pub mirroring: Mirroring,
    pub battery: bool,
    pub tv_system: TvSystem,
    pub region: Region,
    pub prg_ram_size: u32,
    pub chr_ram_size: u32,
    pub prg_rom: std::borrow::Cow<'a, [u8]>,
    pub chr_rom: std::borrow::Cow<'a, [u8]>,
}

impl StaticState<'_> {
    /// Checks the fields a cartridge is allocated from.
    pub fn validate(&self) -> Result<(), SerializationError> {
        let corrupt = |reason| SerializationError::Corrupt {
            blob: Blob::Static,
            reason,
        };
        if self.region == Region::Auto {
            return Err(corrupt("unresolved region"));
        }
        if self.prg_ram_size as usize > MAX_RAM_SIZE {
            return Err(corrupt("PRG RAM size"));
        }
        if self.chr_ram_size as usize > MAX_RAM_SIZE {
            return Err(corrupt("CHR RAM size"));
        }
        Ok(())
    }

    pub fn board_info(&self) -> BoardInfo {
        BoardInfo {
            mapper_id: self.mapper_id,
            submapper: self.submapper,
            mirroring: self.mirroring,
            battery: self.battery,
            tv_system: self.tv_system,
            prg_ram_size: self.prg_ram_size as usize,
            chr_ram_size: self.chr_ram_size as usize,
        }
    }
}

/// Everything `step` can change. Encoded from borrows, decoded into owned
/// values; serde treats both the same on the wire.
#[derive(Debug, Serialize)]
pub(crate) struct DynamicStateRef<'a> {
    pub cpu: &'a Cpu,
    pub ram: &'a [u8],
    pub ppu: &'a Ppu,
    pub apu: &'a Apu,
    pub mapper: &'a Mapper,
    pub prg_ram: &'a [u8],
    pub chr_ram: &'a [u8],
    pub controllers: &'a [Controller; 2],
    pub dot_carry: u32,
    pub oam_dma: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DynamicState {
    pub cpu: Cpu,
    pub ram: Vec<u8>,
    pub ppu: Ppu,
    pub apu: Apu,
    pub mapper: Mapper,
    pub prg_ram: Vec<u8>,
    pub chr_ram: Vec<u8>,
    pub controllers: [Controller; 2],
    pub dot_carry: u32,
    pub oam_dma: Option<u8>,
}

pub(crate) fn encode<T: Serialize>(
    magic: [u8; 4],
    value: &T,
) -> Result<Vec<u8>, SerializationError> {
    let payload = postcard::to_stdvec(value).map_err(SerializationError::Encode)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&magic);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

pub(crate) fn decode<'de, T: Deserialize<'de>>(
    blob: Blob,
    bytes: &'de [u8],
) -> Result<T, SerializationError> {
    let magic = match blob {
        Blob::Static => STATIC_MAGIC,
        Blob::Dynamic => DYNAMIC_MAGIC,
    };
    if bytes.len() < HEADER_LEN {
        return Err(SerializationError::Truncated {
            blob,
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }
    if bytes[..4] != magic {
        return Err(SerializationError::BadMagic { blob });
    }
    let found = u16::from_le_bytes([bytes[4], bytes[5]]);
    if found != FORMAT_VERSION {
        return Err(SerializationError::VersionMismatch {
            blob,
            expected: FORMAT_VERSION,
            found,
        });
    }

    let (value, rest) = postcard::take_from_bytes(&bytes[HEADER_LEN..]).map_err(|err| match err {
        postcard::Error::DeserializeUnexpectedEnd => SerializationError::Corrupt {
            blob,
            reason: "payload ends early",
        },
        other => SerializationError::Decode(other),
    })?;
    if !rest.is_empty() {
        return Err(SerializationError::TrailingBytes {
            blob,
            remaining: rest.len(),
        });
    }
    Ok(value)
}
