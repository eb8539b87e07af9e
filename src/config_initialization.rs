//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::tracing_log::parse_level;
use crate::adapters::AppConfig;
use crate::cli::Cli;

/// Load configuration following precedence: CLI > Env > File > Defaults
pub fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let env_overrides = config
        .apply_env()
        .context("Invalid environment override")?;
    let cli_overrides = apply_cli_overrides(&mut config, cli)?;

    config.validate().context("Invalid configuration")?;
    info!(
        "Configuration loaded ({} environment, {} CLI overrides)",
        env_overrides, cli_overrides
    );
    Ok(config)
}

/// Apply CLI argument overrides, returning how many were applied
pub fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) -> Result<usize> {
    let mut overrides = 0;

    if let Some(level) = &cli.log_level {
        parse_level(level).with_context(|| format!("Invalid --log-level '{}'", level))?;
        config.logging.level = level.clone();
        overrides += 1;
    }
    if cli.json_logs {
        config.logging.json = true;
        overrides += 1;
    }

    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_overrides_env_and_file() {
        let mut config =
            AppConfig::from_toml_str("[logging]\nlevel = \"warn\"\njson = false\n").unwrap();
        config
            .apply_env_from(|key| (key == "CLIPSNIP_LOG_LEVEL").then(|| "info".to_string()))
            .unwrap();
        assert_eq!(config.logging.level, "info");

        let cli = Cli::try_parse_from([
            "clipsnip", "--log-level", "debug", "--json-logs", "validate", "--expected", "1",
            "--actual", "1",
        ])
        .unwrap();
        assert_eq!(apply_cli_overrides(&mut config, &cli).unwrap(), 2);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_no_cli_overrides_keeps_config() {
        let mut config = AppConfig::default();
        let cli = Cli::try_parse_from(["clipsnip", "validate", "--expected", "1", "--actual", "1"])
            .unwrap();
        assert_eq!(apply_cli_overrides(&mut config, &cli).unwrap(), 0);
        assert_eq!(config.logging.level, "info");
    }
}
