//! Content-addressed blob store.
//!
//! Blobs are keyed by the lowercase hex SHA-1 of their bytes. Static blobs
//! are keyed by the digest of their *compressed* form, which is what hosts
//! exchange; dynamic blobs are keyed by the digest of their raw bytes. The
//! store always holds the raw bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use detnes_core::Console;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::compress::compress_blob;
use crate::error::SupportError;

const PREIMAGE_EXT: &str = "bin";

/// Lowercase hex SHA-1 of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn static_digest(static_bytes: &[u8]) -> String {
    digest(&compress_blob(static_bytes))
}

pub fn dynamic_digest(dynamic_bytes: &[u8]) -> String {
    digest(dynamic_bytes)
}

#[derive(Debug, Clone, Default)]
pub struct PreimageStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl PreimageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw bytes under their own digest.
    pub fn insert(&mut self, bytes: Vec<u8>) -> String {
        let key = digest(&bytes);
        self.entries.insert(key.clone(), bytes);
        key
    }

    pub fn insert_static(&mut self, static_bytes: Vec<u8>) -> String {
        let key = static_digest(&static_bytes);
        self.entries.insert(key.clone(), static_bytes);
        key
    }

    pub fn insert_dynamic(&mut self, dynamic_bytes: Vec<u8>) -> String {
        let key = dynamic_digest(&dynamic_bytes);
        self.entries.insert(key.clone(), dynamic_bytes);
        key
    }

    pub fn get(&self, digest: &str) -> Result<&[u8], SupportError> {
        self.entries
            .get(digest)
            .map(Vec::as_slice)
            .ok_or_else(|| SupportError::MissingPreimage(digest.to_string()))
    }

    pub fn contains(&self, digest: &str) -> bool {
        self.entries.contains_key(digest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn digests(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Rebuilds a headless console from two stored preimages.
    pub fn reconstruct(
        &self,
        static_digest: &str,
        dynamic_digest: &str,
        audio_enabled: bool,
    ) -> Result<Console, SupportError> {
        let static_bytes = self.get(static_digest)?;
        let dynamic_bytes = self.get(dynamic_digest)?;
        Ok(Console::new_headless(
            static_bytes,
            dynamic_bytes,
            audio_enabled,
        )?)
    }

    /// Writes every preimage to `<dir>/<digest>.bin`, creating `dir`.
    pub fn write_dir(&self, dir: impl AsRef<Path>) -> Result<(), SupportError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for (key, bytes) in &self.entries {
            fs::write(dir.join(format!("{key}.{PREIMAGE_EXT}")), bytes)?;
        }
        debug!(count = self.entries.len(), dir = %dir.display(), "wrote preimages");
        Ok(())
    }

    /// Loads `<digest>.bin` files from `dir`. Files whose contents match
    /// neither digest rule for their name are skipped.
    pub fn read_dir(dir: impl AsRef<Path>) -> Result<Self, SupportError> {
        let dir = dir.as_ref();
        let mut store = Self::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PREIMAGE_EXT) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let bytes = fs::read(&path)?;
            if key != dynamic_digest(&bytes) && key != static_digest(&bytes) {
                warn!(path = %path.display(), "preimage does not match its name, skipping");
                continue;
            }
            store.entries.insert(key.to_string(), bytes);
        }
        debug!(count = store.len(), dir = %dir.display(), "loaded preimages");
        Ok(store)
    }
}
