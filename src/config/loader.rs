//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ViewerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ViewerConfig, ConfigError> {
    let config: ViewerConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the file (if any), then apply environment overrides and re-validate.
pub fn load_with_env(path: Option<&Path>) -> Result<ViewerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ViewerConfig::default(),
    };
    config.apply_env();
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        api = %config.api.base_url,
        identity = %config.identity.server_url,
        realm = %config.identity.realm,
        "Configuration loaded"
    );
    Ok(config)
}
