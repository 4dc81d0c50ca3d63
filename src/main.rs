// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "barcode-scanner")]
#[command(about = "Scan QR codes from a live camera feed")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scanner screen in the terminal (default)
    Terminal {
        /// Camera index to use (from 'barcode-scanner list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Skip the camera portal and access the device directly
        #[arg(long)]
        no_portal: bool,
    },

    /// List available cameras
    List,

    /// Scan until the first code is decoded and print it
    Scan {
        /// Camera index to use (from 'barcode-scanner list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Give up after this many seconds
        #[arg(short, long, default_value_t = barcode_scanner::constants::timing::DEFAULT_SCAN_TIMEOUT_SECS)]
        timeout: u64,

        /// Skip the camera portal and access the device directly
        #[arg(long)]
        no_portal: bool,
    },

    /// Decode QR codes in an image file
    Decode {
        /// Image to decode
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Terminal {
        camera: None,
        no_portal: false,
    });

    // The terminal screen owns stdout, so its logs go to a file
    init_logging(matches!(command, Commands::Terminal { .. }));

    match command {
        Commands::Terminal { camera, no_portal } => cli::run_terminal(camera, no_portal),
        Commands::List => cli::list_cameras(),
        Commands::Scan {
            camera,
            timeout,
            no_portal,
        } => cli::scan(camera, timeout, no_portal),
        Commands::Decode { path } => cli::decode_image(&path),
    }
}

/// Initialize logging
///
/// Set RUST_LOG to control the level, e.g. RUST_LOG=debug or
/// RUST_LOG=barcode_scanner=info
fn init_logging(to_file: bool) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    if to_file && let Some(file) = cli::open_log_file() {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_target(true)
            .with_level(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}
