//! Stridelab CLI: gait analysis over JSONL sensor exports.
//!
//! Usage:
//!   stridelab gait <IMU>          Detect gait cycles from phone IMU samples
//!   stridelab symmetry <STEPS>    Pair feet, compute symmetry, filter to running bouts
//!   stridelab gsi <IMU>           Autocorrelation gait symmetry index
//!   stridelab bouts <ACTIVITY>    Activity and elevation bout tables
//!   stridelab quality <STEPS>     Footpod plausibility per session

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stridelab_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "stridelab",
    about = "Running gait symmetry analysis from footpod and phone sensor streams",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect gait cycles from vertical acceleration
    Gait {
        /// IMU samples (JSONL)
        imu: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Labels assigned to alternate steps
        #[arg(long, value_delimiter = ',', default_value = "A,B")]
        feet: Vec<String>,

        /// Write raw gait cycles instead of per-foot step records
        #[arg(long)]
        cycles: bool,
    },

    /// Pair left/right steps, compute symmetry and keep clean running bouts
    Symmetry {
        /// Per-foot step records (JSONL)
        steps: PathBuf,

        /// Phone activity samples (JSONL)
        #[arg(long)]
        activity: Option<PathBuf>,

        /// Session windows (JSONL)
        #[arg(long)]
        sessions: Option<PathBuf>,

        /// Music playstate samples (JSONL)
        #[arg(long)]
        music: Option<PathBuf>,

        /// Music section boundaries (JSONL), requires --music
        #[arg(long, requires = "music")]
        sections: Option<PathBuf>,

        /// Phone IMU samples (JSONL); adds per-bout GSI to the summary
        #[arg(long, requires = "summary")]
        imu: Option<PathBuf>,

        /// Symmetry method: si|sa|usi|wusi
        #[arg(long)]
        method: Option<String>,

        /// Foot labels, left first
        #[arg(long, value_delimiter = ',')]
        feet: Option<Vec<String>>,

        /// Which foot anchors merged rows: first|second|both
        #[arg(long, default_value = "both")]
        side: String,

        /// Drop sessions that fail the footpod plausibility checks
        #[arg(long, requires = "sessions")]
        pod_checks: bool,

        /// Output file for filtered steps (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write per-session/track/section statistics to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Compute the autocorrelation gait symmetry index
    Gsi {
        /// IMU samples (JSONL)
        imu: PathBuf,

        /// Compute one value per session (JSONL) instead of the whole recording
        #[arg(long, conflicts_with = "activity")]
        sessions: Option<PathBuf>,

        /// Compute one value per running bout of these activity samples (JSONL)
        #[arg(long)]
        activity: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract padded activity or elevation-change bouts
    Bouts {
        /// Phone activity samples (JSONL)
        activity: PathBuf,

        /// Emit elevation-change bouts instead of activity bouts
        #[arg(long)]
        elevation: bool,

        /// Activity label that counts as valid
        #[arg(long)]
        label: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report footpod plausibility checks per session
    Quality {
        /// Per-foot step records (JSONL)
        steps: PathBuf,

        /// Session windows (JSONL)
        #[arg(long)]
        sessions: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    stridelab_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Gait {
            imu,
            output,
            feet,
            cycles,
        } => commands::gait::run(&config, imu, output, feet, cycles),
        Commands::Symmetry {
            steps,
            activity,
            sessions,
            music,
            sections,
            imu,
            method,
            feet,
            side,
            pod_checks,
            output,
            summary,
        } => commands::symmetry::run(
            &config,
            commands::symmetry::Inputs {
                steps,
                activity,
                sessions,
                music,
                sections,
                imu,
            },
            commands::symmetry::Options {
                method,
                feet,
                side,
                pod_checks,
                output,
                summary,
            },
        ),
        Commands::Gsi {
            imu,
            sessions,
            activity,
            output,
        } => commands::gsi::run(&config, imu, sessions, activity, output),
        Commands::Bouts {
            activity,
            elevation,
            label,
            output,
        } => commands::bouts::run(&config, activity, elevation, label, output),
        Commands::Quality {
            steps,
            sessions,
            output,
        } => commands::quality::run(steps, sessions, output),
    }
}
