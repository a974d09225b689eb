//! Run-mode policy for a console.
//!
//! Nothing in here is machine state: two consoles with different configs but
//! the same blobs step through identical states, and none of these fields are
//! ever written into a blob.

pub mod region;

pub use region::{Region, Timing};

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Timing override. Ignored when rebuilding from blobs, which carry the
    /// region they were recorded with.
    pub region: Region,
    /// Mix and queue audio samples. Channels are clocked either way.
    pub audio_enabled: bool,
    /// Refresh the RGBA presentation frame at every vertical blank.
    pub render_pixels: bool,
    pub sample_rate: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            region: Region::Auto,
            audio_enabled: true,
            render_pixels: true,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl ConsoleConfig {
    /// Headless replay profile: no sample synthesis, no RGBA conversion.
    pub fn headless(audio_enabled: bool) -> Self {
        Self {
            audio_enabled,
            render_pixels: false,
            ..Self::default()
        }
    }
}
