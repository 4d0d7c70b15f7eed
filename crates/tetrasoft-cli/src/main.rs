//! tetrasoft CLI: run, inspect, and validate soft-body assets.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;

#[derive(Parser)]
#[command(name = "tetrasoft")]
#[command(version, about = "tetrasoft: XPBD soft-body simulation over tetrahedral meshes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load `<asset-dir>/<name>.obj` and its `.tetra`, and run frames.
    Simulate {
        /// Asset root containing `<name>.obj` and `Tetra/<name>.tetra`.
        #[arg(short, long, default_value = "assets")]
        asset_dir: PathBuf,

        /// Asset name.
        #[arg(short, long)]
        name: String,

        /// Solver config (TOML). Missing keys take defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of frames to run.
        #[arg(short, long, default_value_t = 120)]
        frames: u32,

        /// Pin every simulation vertex at or above this height.
        #[arg(long)]
        pin_above: Option<f32>,

        /// Write final visual positions and diagnostics as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print counts and rest-shape statistics of a `.tetra` file.
    Inspect {
        path: PathBuf,
    },

    /// Validate a config (`.toml`), tetra asset (`.tetra`), or visual mesh (`.obj`).
    Validate {
        path: PathBuf,
    },

    /// Write a procedural box asset (`.tetra` plus a point-grid `.obj`).
    Generate {
        #[arg(short, long, default_value = "assets")]
        asset_dir: PathBuf,

        #[arg(short, long, default_value = "Box")]
        name: String,

        /// Cells per axis.
        #[arg(long, default_value_t = 4)]
        cells: usize,

        /// Cell edge length.
        #[arg(long, default_value_t = 0.25)]
        cell_size: f32,

        /// Height of the box's lower face.
        #[arg(long, default_value_t = 1.0)]
        lift: f32,

        /// Visual points per axis.
        #[arg(long, default_value_t = 16)]
        resolution: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            asset_dir,
            name,
            config,
            frames,
            pin_above,
            output,
        } => commands::simulate(&commands::SimulateArgs {
            asset_dir,
            name,
            config,
            frames,
            pin_above,
            output,
        }),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Validate { path } => commands::validate(&path),
        Commands::Generate {
            asset_dir,
            name,
            cells,
            cell_size,
            lift,
            resolution,
        } => commands::generate(&asset_dir, &name, cells, cell_size, lift, resolution),
    };

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}
