//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level. Output goes to
//! stderr so score reports written to stdout stay clean.

use tracing_subscriber::EnvFilter;

use crate::domain::error::EsgError;

pub fn init(log_level: &str) -> Result<(), EsgError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|e| EsgError::ConfigInvalid {
            section: "logging".to_string(),
            key: "level".to_string(),
            reason: format!("unable to build log filter from '{}': {}", log_level, e),
        })?,
    };

    // A subscriber installed earlier in the process keeps running.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(false)
        .try_init();
    Ok(())
}
