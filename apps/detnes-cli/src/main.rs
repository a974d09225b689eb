mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::FmtSubscriber;

use crate::{
    args::{Args, Command},
    commands::ReplayOptions,
};

fn main() -> Result<()> {
    let args = Args::parse();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Encode {
            roms,
            preimages,
            warmup_frames,
            machine,
        } => commands::encode(&roms, preimages.as_deref(), warmup_frames, machine.config()),
        Command::Replay {
            static_blob,
            dynamic_blob,
            activity,
            ticks,
            steps_per_tick,
            out,
            audio,
        } => commands::replay(ReplayOptions {
            static_blob: &static_blob,
            dynamic_blob: &dynamic_blob,
            activity: activity.as_deref(),
            ticks,
            steps_per_tick,
            out: out.as_deref(),
            audio,
        }),
        Command::Run {
            rom,
            seconds,
            machine,
        } => commands::run(&rom, seconds, machine.config()),
    }
}
