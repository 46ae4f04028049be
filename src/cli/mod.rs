//! CLI Module
//!
//! Command-line interface for the Depthforge conversion session.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::progress::AdvanceMode;
use crate::viewer::ExportFormat;

/// Depthforge - turn a 2D image into a (placeholder) 3D model
#[derive(Parser, Debug)]
#[command(name = "depthforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload an image, run the conversion and save the model files
    #[command(name = "convert")]
    Convert {
        /// Image to convert
        image: PathBuf,

        /// Formats to write (repeatable; defaults to all)
        #[arg(short, long = "format")]
        formats: Vec<ExportFormat>,

        /// Output directory (overrides the config file)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Run the simulated clock faster (e.g. 8.0)
        #[arg(long)]
        time_scale: Option<f64>,

        /// Stage advance mode
        #[arg(long, value_parser = parse_advance_mode)]
        mode: Option<AdvanceMode>,
    },

    /// Check whether an image would be accepted
    #[command(name = "validate")]
    Validate {
        /// Image to check
        image: PathBuf,
    },

    /// Print the conversion stage table
    #[command(name = "stages")]
    Stages,

    /// Print the available export formats
    #[command(name = "formats")]
    Formats,
}

fn parse_advance_mode(s: &str) -> std::result::Result<AdvanceMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "scheduled" => Ok(AdvanceMode::Scheduled),
        "frame-synchronized" | "frame-sync" => Ok(AdvanceMode::FrameSynchronized),
        other => Err(format!(
            "unknown mode '{}' (expected 'scheduled' or 'frame-synchronized')",
            other
        )),
    }
}
