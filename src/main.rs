//! clipsnip CLI
//!
//! # Usage
//!
//! ```bash
//! clipsnip trim --input talk.mp4 --start 01:05 --end 01:30
//! clipsnip plan --input talk.mp4 --start 65 --end 90 --mode copy
//! clipsnip extract --transcript segments.json --prompt "pricing discussion"
//! clipsnip validate --expected 25 --actual 25.02
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use clipsnip::adapters::tracing_log::init_logging;
use clipsnip::cli::{commands, Cli};
use clipsnip::config_initialization::load_configuration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_configuration(&cli)?;
    init_logging(&config.logging.level, config.logging.json)?;
    info!("Starting clipsnip v{}", env!("CARGO_PKG_VERSION"));

    commands::dispatch(cli.command, &config).await
}
