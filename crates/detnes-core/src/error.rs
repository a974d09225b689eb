use thiserror::Error;

use crate::cartridge::header::{NES_HEADER_LEN, RomFormat};

/// Failures raised while turning a ROM image into a cartridge.
///
/// A load error is fatal to that load attempt; no partially built console is
/// ever handed back to the caller.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Provided buffer is shorter than the 16-byte header.
    #[error("header expected {NES_HEADER_LEN} bytes, got {actual}")]
    TooShort { actual: usize },
    /// Magic number ("NES<EOF>") is missing.
    #[error("missing NES magic bytes")]
    InvalidMagic,
    /// Header advertises a format that is not accepted.
    #[error("unsupported iNES header format: {0:?}")]
    UnsupportedFormat(RomFormat),
    /// A ROM section (trainer/PRG/CHR) is shorter than advertised.
    #[error("{section} section expected {expected} bytes, got {actual}")]
    SectionTooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The board cannot address a ROM of this size.
    #[error("mapper {mapper} cannot address a {size} byte {section} ROM")]
    InvalidRomSize {
        mapper: u16,
        section: &'static str,
        size: usize,
    },
    /// Mapper number outside the implemented set.
    #[error("unsupported mapper {mapper_id}")]
    UnsupportedMapper { mapper_id: u16 },
    #[error("i/o error while reading cartridge: {0}")]
    Io(#[from] std::io::Error),
}

/// Which of the two state blobs a serialization error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blob {
    Static,
    Dynamic,
}

impl std::fmt::Display for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Blob::Static => f.write_str("static"),
            Blob::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// Failures raised while encoding or decoding state blobs.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("{blob} blob truncated: expected at least {expected} bytes, got {actual}")]
    Truncated {
        blob: Blob,
        expected: usize,
        actual: usize,
    },
    #[error("{blob} blob has an unknown magic tag")]
    BadMagic { blob: Blob },
    #[error("{blob} blob format version {found} does not match {expected}")]
    VersionMismatch {
        blob: Blob,
        expected: u16,
        found: u16,
    },
    #[error("{blob} blob is corrupt: {reason}")]
    Corrupt { blob: Blob, reason: &'static str },
    #[error("dynamic state belongs to mapper {found}, cartridge uses mapper {expected}")]
    MapperMismatch { expected: u16, found: u16 },
    #[error("{blob} blob has {remaining} trailing bytes")]
    TrailingBytes { blob: Blob, remaining: usize },
    #[error("failed to decode state: {0}")]
    Decode(#[source] postcard::Error),
    #[error("failed to encode state: {0}")]
    Encode(#[source] postcard::Error),
}

/// Umbrella error for operations that can fail in either domain, such as
/// rebuilding a console from a static/dynamic blob pair.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}
