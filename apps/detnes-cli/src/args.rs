use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use detnes_core::{ConsoleConfig, Region};
use tracing::Level;

/// Deterministic NES emulator: state blobs, headless replay and runs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Maximum log level
    #[arg(long, global = true, default_value_t = Level::INFO)]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write static and dynamic blobs for each ROM next to it
    Encode {
        #[arg(required = true)]
        roms: Vec<PathBuf>,

        /// Also write `<digest>.bin` preimages into this directory
        #[arg(long)]
        preimages: Option<PathBuf>,

        /// Frames to run before taking the dynamic blob
        #[arg(long, default_value_t = 0)]
        warmup_frames: u32,

        #[command(flatten)]
        machine: MachineArgs,
    },

    /// Rebuild a console from blobs, replay an activity, write the new dynamic blob
    Replay {
        #[arg(long = "static")]
        static_blob: PathBuf,

        #[arg(long = "dynamic")]
        dynamic_blob: PathBuf,

        /// Activity file (`|ticks|RLDUTSBA|RLDUTSBA|` records)
        #[arg(long)]
        activity: Option<PathBuf>,

        /// Extra ticks after the activity
        #[arg(long, default_value_t = 0)]
        ticks: u64,

        #[arg(long, default_value_t = 1_000)]
        steps_per_tick: u64,

        /// Where the resulting dynamic blob goes
        #[arg(long)]
        out: Option<PathBuf>,

        /// Synthesize audio while replaying
        #[arg(long)]
        audio: bool,
    },

    /// Run a ROM for a while and print a machine summary
    Run {
        rom: PathBuf,

        #[arg(long, default_value_t = 1.0)]
        seconds: f64,

        #[command(flatten)]
        machine: MachineArgs,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct MachineArgs {
    #[arg(long, value_enum, default_value_t = RegionArg::Auto)]
    pub region: RegionArg,

    /// Disable audio
    #[arg(long)]
    pub no_audio: bool,

    #[arg(long, default_value_t = detnes_core::config::DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,
}

impl MachineArgs {
    pub fn config(&self) -> ConsoleConfig {
        ConsoleConfig {
            region: self.region.into(),
            audio_enabled: !self.no_audio,
            render_pixels: false,
            sample_rate: self.sample_rate,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionArg {
    Auto,
    Ntsc,
    Pal,
    Dendy,
}

impl From<RegionArg> for Region {
    fn from(region: RegionArg) -> Self {
        match region {
            RegionArg::Auto => Region::Auto,
            RegionArg::Ntsc => Region::Ntsc,
            RegionArg::Pal => Region::Pal,
            RegionArg::Dendy => Region::Dendy,
        }
    }
}
