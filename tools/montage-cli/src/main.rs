//! Montage CLI — command-line interface for project creation, inspection,
//! baking, and export.
//!
//! Usage:
//!   montage init <NAME>        Create a new project
//!   montage info <PATH>        Show project information
//!   montage validate <PATH>    Validate a project directory
//!   montage bake <PATH>        Rebuild animation sample tables
//!   montage export <PATH>      Export a project to video

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "montage",
    about = "Headless timeline compositing and video export",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project
    Init {
        /// Project name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output width
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Output height
        #[arg(long, default_value = "1080")]
        height: u32,

        /// Output frame rate
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Seed the timeline with an animated demo scene
        #[arg(long)]
        demo: bool,
    },

    /// Show project information
    Info {
        /// Path to the project directory
        path: PathBuf,

        /// Print a machine-readable JSON summary instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a project directory
    Validate {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Rebuild every animation sample table from its declared keyframes
    Bake {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Export a project to video
    Export {
        /// Path to the project directory
        path: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the output frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Override the output width
        #[arg(long)]
        width: Option<u32>,

        /// Override the output height
        #[arg(long)]
        height: Option<u32>,

        /// Override the output duration (seconds)
        #[arg(long)]
        duration: Option<f64>,

        /// Video bitrate in kbit/s
        #[arg(long, default_value = "5000")]
        bitrate: u32,

        /// Write numbered PNG frames to this directory instead of encoding
        #[arg(long)]
        frames_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let mut config = montage_common::config::AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    montage_common::logging::init_logging(&config.logging);
    tracing::debug!(
        projects_dir = %config.projects_dir.display(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Init {
            name,
            output,
            width,
            height,
            fps,
            demo,
        } => commands::init::run(name, output, width, height, fps, demo),
        Commands::Info { path, json } => commands::info::run(path, json),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Bake { path } => commands::bake::run(path),
        Commands::Export {
            path,
            output,
            fps,
            width,
            height,
            duration,
            bitrate,
            frames_dir,
        } => commands::export::run(path, output, fps, width, height, duration, bitrate, frames_dir).await,
    }
}
