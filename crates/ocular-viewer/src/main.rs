#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ocular_viewer::{SimFaults, SimulatedHost, TracePainter, ViewerConfig};
use ocular_vr::SessionController;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ocular-viewer")]
struct Args {
    /// Frames to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Frame index at which the user triggers VR entry.
    #[arg(long, default_value_t = 120)]
    enter_at: u32,
    /// Seed for the simulated host.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Optional JSON config; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Serve corrupted tracking bytes every Nth frame (0 disables).
    #[arg(long, default_value_t = 0)]
    garbage_every: u32,
    /// Host refuses the present request.
    #[arg(long)]
    refuse_present: bool,
    /// Host grants the request but never starts presenting.
    #[arg(long)]
    never_present: bool,
}

fn main() -> Result<()> {
    ocular_common::init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    info!(
        canvas = %config.canvas_id,
        button = %config.enter_button_id,
        "viewer starting"
    );

    let faults = SimFaults {
        refuse_present: args.refuse_present,
        never_present: args.never_present,
        garbage_every: args.garbage_every,
    };
    let host = SimulatedHost::with_faults(args.seed, faults);
    let mut painter = TracePainter::new(1280, 720);
    let mut session = SessionController::new(host, config.layer());

    for tick in 0..args.ticks {
        session.host_mut().advance();
        if tick == args.enter_at {
            session.enter_vr();
        }
        session.tick(&mut painter);
    }

    info!(
        mode = ?session.mode(),
        use_vr = session.use_vr(),
        frames_submitted = session.frames_submitted(),
        mono_draws = painter.mono_draws,
        stereo_draws = painter.stereo_draws,
        swaps = painter.swaps,
        "viewer finished"
    );
    Ok(())
}
