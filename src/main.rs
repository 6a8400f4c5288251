// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use geosnap::Config;
use geosnap::logging::{self, LogTarget};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "geosnap")]
#[command(about = "Capture a photo and a GPS fix, then export a text report")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: ~/.config/geosnap/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Acquire one location fix and print it
    Locate {
        /// Print the fix as JSON
        #[arg(long)]
        json: bool,
    },

    /// Capture a photo and a location fix without the interface, then export the report
    Snapshot {
        /// Skip the photo
        #[arg(long)]
        no_photo: bool,

        /// Skip the location fix
        #[arg(long)]
        no_location: bool,

        /// Output directory (default: configured export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set RUST_LOG to override, e.g. RUST_LOG=geosnap=trace
    let target = if cli.command.is_none() {
        LogTarget::default_file()
    } else {
        LogTarget::Stderr
    };
    logging::init(cli.verbose, &target)?;

    let config = Config::load_from(cli.config)?;

    match cli.command {
        Some(Commands::List) => cli::list_cameras(&config),
        Some(Commands::Locate { json }) => cli::locate(&config, json),
        Some(Commands::Snapshot {
            no_photo,
            no_location,
            output,
        }) => cli::snapshot(&config, !no_photo, !no_location, output),
        None => geosnap::terminal::run(config),
    }
}
