//! Command line front end for bowling pose risk analysis.

use anyhow::{Context, Result};
use bowling_pose_analysis::{app::BowlingPoseApp, config::Config};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a clip from an exported angle table
    Summarize {
        /// Angle table (CSV) written by `analyze --csv`
        #[arg(short, long)]
        angles: PathBuf,

        /// Classify the clip and print advisories
        #[arg(long)]
        classify: bool,
    },

    /// Add a rule-based risk label column to an angle table
    Label {
        /// Angle table (CSV) to label
        #[arg(short, long)]
        angles: PathBuf,

        /// Where to write the labeled table
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Analyze a bowling video
    #[cfg(feature = "vision")]
    Analyze {
        /// Video file to process
        #[arg(short, long)]
        video: PathBuf,

        /// Analyze every Nth frame (overrides the config)
        #[arg(short, long)]
        stride: Option<usize>,

        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<usize>,

        /// Write the per-frame angles to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write an annotated copy of the analyzed frames to this file
        #[arg(long)]
        annotate: Option<PathBuf>,

        /// Classify the clip and print advisories
        #[arg(long)]
        classify: bool,
    },

    /// Print an example configuration file
    ExampleConfig,
}

fn load_config(path: Option<&PathBuf>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };

    info!("Loading configuration from: {}", path.display());
    match Config::from_file(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Failed to load config file: {}. Using defaults.", e);
            Config::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let app = BowlingPoseApp::new(load_config(args.config.as_ref())).context("Invalid configuration")?;

    match args.command {
        Command::Summarize { angles, classify } => {
            let report = app
                .summarize_table(&angles, classify)
                .with_context(|| format!("Failed to summarize {}", angles.display()))?;
            print!("{}", report.text());
        }
        Command::Label { angles, output } => {
            let risky = app
                .label_table(&angles, &output)
                .with_context(|| format!("Failed to label {}", angles.display()))?;
            println!("{risky} risky rows written to {}", output.display());
        }
        #[cfg(feature = "vision")]
        Command::Analyze {
            video,
            stride,
            max_frames,
            csv,
            annotate,
            classify,
        } => {
            let options = bowling_pose_analysis::app::AnalyzeOptions {
                video,
                stride,
                max_frames,
                csv,
                annotate,
                classify,
            };
            let report = app
                .analyze_video(&options)
                .with_context(|| format!("Failed to analyze {}", options.video.display()))?;
            print!("{}", report.text());
        }
        Command::ExampleConfig => print!("{}", bowling_pose_analysis::config::EXAMPLE_CONFIG),
    }

    Ok(())
}
