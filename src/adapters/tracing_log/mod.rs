// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_logging(level: &str, json: bool) -> Result<(), DomainError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(level),
    }
    .map_err(|e| DomainError::Config(format!("Invalid log level '{}': {}", level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // An already-installed subscriber is not an error
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    Ok(())
}

/// Validate a level or directive string without installing anything
pub fn parse_level(level: &str) -> Result<EnvFilter, DomainError> {
    EnvFilter::try_new(level)
        .map_err(|e| DomainError::Config(format!("Invalid log level '{}': {}", level, e)))
}
