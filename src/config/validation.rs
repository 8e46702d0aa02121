//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs, identifiers and value ranges
//! - Check that grant credentials are present
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ViewerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::str::FromStr;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

use crate::config::schema::{GrantConfig, ViewerConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ViewerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_http_url("api.base_url", &config.api.base_url, &mut errors);
    if config.api.timeout_secs == 0 {
        errors.push(ValidationError::new("api.timeout_secs", "must be greater than zero"));
    }

    let identity = &config.identity;
    check_http_url("identity.server_url", &identity.server_url, &mut errors);
    if identity.realm.trim().is_empty() {
        errors.push(ValidationError::new("identity.realm", "must not be empty"));
    }
    if identity.client_id.trim().is_empty() {
        errors.push(ValidationError::new("identity.client_id", "must not be empty"));
    }
    if identity.max_attempts == 0 {
        errors.push(ValidationError::new("identity.max_attempts", "must be at least 1"));
    }
    if identity.timeout_secs == 0 {
        errors.push(ValidationError::new("identity.timeout_secs", "must be greater than zero"));
    }
    if identity.algorithms.is_empty() {
        errors.push(ValidationError::new("identity.algorithms", "must not be empty"));
    }
    for alg in &identity.algorithms {
        if Algorithm::from_str(&alg.to_uppercase()).is_err() {
            errors.push(ValidationError::new(
                "identity.algorithms",
                format!("unknown algorithm '{}'", alg),
            ));
        }
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    match &identity.grant {
        GrantConfig::Password { username, password } => {
            if username.is_empty() || password.is_empty() {
                errors.push(ValidationError::new(
                    "identity.grant",
                    "password grant requires username and password",
                ));
            }
        }
        GrantConfig::ClientCredentials { client_secret } => {
            if client_secret.is_empty() {
                errors.push(ValidationError::new(
                    "identity.grant",
                    "client_credentials grant requires client_secret",
                ));
            }
        }
        // An empty token is allowed: it simply yields an unauthenticated session.
        GrantConfig::Token { .. } => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}
