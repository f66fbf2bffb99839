//! Webpress CLI - resize images and convert them to quality-controlled WebP.
//!
//! Takes a JPEG, PNG, GIF, BMP or WebP file, resizes it to a preset or custom
//! size, encodes it as lossy WebP, and prints a before/after report. Results
//! can be saved to a local asset directory.
//!
//! # Usage
//!
//! ```bash
//! # Convert to the default (header) size at quality 80
//! webpress convert photo.jpg
//!
//! # Custom size and quality, saved to the asset store
//! webpress convert logo.png --size 400x400 --quality 65 --save
//!
//! # Save WebP bytes (or a data URL) produced elsewhere
//! webpress save canvas-export.txt --title "Hero banner"
//!
//! # List size presets
//! webpress presets
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Webpress - resize images and convert them to quality-controlled WebP.
#[derive(Parser, Debug)]
#[command(name = "webpress")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an image to WebP at a preset or custom size
    Convert(cli::convert::ConvertArgs),

    /// Save already-converted WebP bytes or a data URL to the asset store
    Save(cli::save::SaveArgs),

    /// List the available size presets
    Presets(cli::presets::PresetsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match webpress_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `webpress config path`."
            );
            webpress_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Webpress v{}", webpress_core::VERSION);

    match cli.command {
        Commands::Convert(args) => cli::convert::execute(args, &config).await,
        Commands::Save(args) => cli::save::execute(args, &config).await,
        Commands::Presets(args) => cli::presets::execute(args),
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
