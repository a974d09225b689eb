//! LZ4 block compression for blobs at rest or in transit.
//!
//! The uncompressed length is prepended as a little-endian `u32`, so a
//! compressed blob is self-describing.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::error::SupportError;

pub fn compress_blob(bytes: &[u8]) -> Vec<u8> {
    compress_prepend_size(bytes)
}

pub fn decompress_blob(bytes: &[u8]) -> Result<Vec<u8>, SupportError> {
    decompress_size_prepended(bytes).map_err(|err| SupportError::Decompress(err.to_string()))
}
