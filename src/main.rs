// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use depthgrab::surface::OutputMode;

mod cli;

#[derive(Parser)]
#[command(name = "depthgrab")]
#[command(about = "Depth camera capture and conversion pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available depth devices
    List {
        /// Print the device list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Grab frames from a device and report conversion statistics
    Grab {
        /// Device identifier (from 'depthgrab list'; default: first device)
        #[arg(short, long)]
        device: Option<String>,

        /// Number of ticks to run
        #[arg(short, long, default_value = "120")]
        ticks: u64,

        /// Output representation
        #[arg(short, long, value_enum, default_value = "depth")]
        mode: ModeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Single-channel scaled depth map
    Depth,
    /// Four-channel camera-space point cloud
    Pointcloud,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Depth => OutputMode::Depth,
            ModeArg::Pointcloud => OutputMode::PointCloud,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG to control the log level
    // Examples: RUST_LOG=debug, RUST_LOG=depthgrab=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List { json }) => cli::list_devices(json),
        Some(Commands::Grab {
            device,
            ticks,
            mode,
        }) => cli::grab(device, ticks, mode.into()),
        None => cli::list_devices(false),
    }
}
