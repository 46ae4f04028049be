//! Depthforge CLI - Image-to-3D Conversion
//!
//! Command-line interface for the Depthforge conversion session.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;
use tracing_subscriber::EnvFilter;

use depthforge::cli::commands::{self, ConvertOverrides};
use depthforge::cli::{Cli, Commands};
use depthforge::ForgeConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("Depthforge v{}", env!("CARGO_PKG_VERSION"));

    let config = ForgeConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Some(cmd) => handle_command(cmd, config),
        None => {
            println!("Depthforge v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    // tracing events from the backend; log records go through env_logger
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
}

fn handle_command(cmd: Commands, config: ForgeConfig) -> anyhow::Result<()> {
    match cmd {
        Commands::Convert {
            image,
            formats,
            out,
            time_scale,
            mode,
        } => {
            let overrides = ConvertOverrides {
                output_dir: out,
                time_scale,
                advance_mode: mode,
            };
            let config = overrides.apply(config).context("invalid convert options")?;
            let written = commands::convert(config, &image, &formats)
                .with_context(|| format!("conversion of {} failed", image.display()))?;
            info!("Wrote {} file(s)", written.len());
            Ok(())
        }
        Commands::Validate { image } => {
            commands::validate(&config, &image)
                .with_context(|| format!("{} was rejected", image.display()))?;
            Ok(())
        }
        Commands::Stages => Ok(commands::print_stages()?),
        Commands::Formats => Ok(commands::print_formats()?),
    }
}
