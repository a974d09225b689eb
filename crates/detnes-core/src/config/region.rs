use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cartridge::header::TvSystem;

/// Timing family the console runs with.
///
/// `Auto` defers to the cartridge header; every other variant is a concrete
/// profile. Only concrete regions are ever stored in a static blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    Auto,
    Ntsc,
    Pal,
    Dendy,
}

impl Region {
    /// A user choice other than `Auto` wins over the header hint.
    pub fn resolve(self, tv: TvSystem) -> Region {
        match self {
            Region::Auto => match tv {
                TvSystem::Ntsc | TvSystem::Dual => Region::Ntsc,
                TvSystem::Pal => Region::Pal,
                TvSystem::Dendy => Region::Dendy,
            },
            other => other,
        }
    }

    /// Clock and frame geometry for a resolved region. `Auto` maps to NTSC.
    pub fn timing(self) -> Timing {
        match self {
            Region::Auto | Region::Ntsc => Timing::NTSC,
            Region::Pal => Timing::PAL,
            Region::Dendy => Timing::DENDY,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::Auto => "auto",
            Region::Ntsc => "ntsc",
            Region::Pal => "pal",
            Region::Dendy => "dendy",
        };
        f.write_str(s)
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Region::Auto),
            "ntsc" => Ok(Region::Ntsc),
            "pal" => Ok(Region::Pal),
            "dendy" => Ok(Region::Dendy),
            other => Err(format!("unknown region `{other}`")),
        }
    }
}

/// Frame geometry and clock ratios of one region.
///
/// The PPU runs `ppu_dots_num / ppu_dots_den` dots per CPU cycle. The ratio is
/// kept as an exact fraction and advanced with an integer remainder so it
/// never drifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub cpu_hz: u32,
    pub scanlines: u16,
    pub vblank_line: u16,
    pub ppu_dots_num: u32,
    pub ppu_dots_den: u32,
    /// PAL period tables for noise, DMC and the frame sequencer.
    pub pal_apu: bool,
    /// NTSC skips one dot on odd frames when rendering.
    pub odd_frame_skip: bool,
}

impl Timing {
    pub const NTSC: Timing = Timing {
        cpu_hz: 1_789_773,
        scanlines: 262,
        vblank_line: 241,
        ppu_dots_num: 3,
        ppu_dots_den: 1,
        pal_apu: false,
        odd_frame_skip: true,
    };

    pub const PAL: Timing = Timing {
        cpu_hz: 1_662_607,
        scanlines: 312,
        vblank_line: 241,
        ppu_dots_num: 16,
        ppu_dots_den: 5,
        pal_apu: true,
        odd_frame_skip: false,
    };

    pub const DENDY: Timing = Timing {
        cpu_hz: 1_773_448,
        scanlines: 312,
        vblank_line: 291,
        ppu_dots_num: 3,
        ppu_dots_den: 1,
        pal_apu: false,
        odd_frame_skip: false,
    };

    pub fn pre_render_line(&self) -> u16 {
        self.scanlines - 1
    }

    /// CPU cycles in a `seconds` long interval, truncated.
    pub fn cycles_for(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.cpu_hz as f64) as u64
    }
}
