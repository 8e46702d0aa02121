//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Select pretty or JSON output
//! - Configure log level from config, overridable via `RUST_LOG`
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Initialization is idempotent so tests and embedders can call it freely

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
}

/// Default filter for a configured level: our crate at `level`, dependencies at warn.
pub fn default_filter(level: &str) -> String {
    format!("warn,folio_viewer={}", level)
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` if a subscriber was already installed.
pub fn init(config: &ObservabilityConfig) -> Result<bool, LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = default_filter(&config.log_level);
            EnvFilter::try_new(&directives).map_err(|source| LoggingError::Filter {
                filter: directives,
                source,
            })?
        }
    };

    let (json, pretty) = if config.json {
        (Some(fmt::layer().json().with_current_span(false)), None)
    } else {
        (None, Some(fmt::layer().with_target(false)))
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level = %config.log_level, json = config.json, "Logging initialized");
    }
    Ok(installed)
}
