//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the viewer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the viewer shell.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Manuscript API settings (base URL, timeouts).
    pub api: ApiConfig,

    /// Identity provider settings.
    pub identity: IdentityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ViewerConfig {
    /// Apply `FOLIO_*` environment overrides on top of the file values.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FOLIO_API_URL") {
            self.api.base_url = url;
        }
        if let Some(url) = lookup("FOLIO_IDENTITY_URL") {
            self.identity.server_url = url;
        }
        if let Some(realm) = lookup("FOLIO_REALM") {
            self.identity.realm = realm;
        }
        if let Some(client_id) = lookup("FOLIO_CLIENT_ID") {
            self.identity.client_id = client_id;
        }
        if let Some(access_token) = lookup("FOLIO_ACCESS_TOKEN") {
            self.identity.grant = GrantConfig::Token { access_token };
        }
    }
}

/// Manuscript API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL prepended to every relative request path.
    pub base_url: String,

    /// Request timeout (total time for request/response) in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// How the session is established on load.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OnLoad {
    /// Authentication is mandatory before the application mounts.
    #[default]
    LoginRequired,
    /// Only reuse an already issued token; never exchange credentials.
    CheckSso,
}

/// Credentials used to obtain an access token.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrantConfig {
    /// Resource owner password grant (Keycloak "direct access grants").
    Password { username: String, password: String },

    /// Confidential client grant.
    ClientCredentials { client_secret: String },

    /// A token issued out of band (e.g. copied from a browser session).
    Token {
        #[serde(default)]
        access_token: String,
    },
}

impl Default for GrantConfig {
    fn default() -> Self {
        GrantConfig::Token {
            access_token: String::new(),
        }
    }
}

impl GrantConfig {
    /// The OAuth2 `grant_type` sent to the token endpoint, if any.
    pub fn grant_type(&self) -> Option<&'static str> {
        match self {
            GrantConfig::Password { .. } => Some("password"),
            GrantConfig::ClientCredentials { .. } => Some("client_credentials"),
            GrantConfig::Token { .. } => None,
        }
    }
}

/// Identity provider (OpenID Connect) configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IdentityConfig {
    /// When disabled the shell mounts with an anonymous session.
    pub enabled: bool,

    /// Identity server root (e.g., "http://localhost:8024").
    pub server_url: String,

    /// Realm the client is registered in.
    pub realm: String,

    /// Public client identifier.
    pub client_id: String,

    /// Session establishment mode.
    pub on_load: OnLoad,

    /// Credentials for the token endpoint.
    pub grant: GrantConfig,

    /// Accepted token signing algorithms.
    pub algorithms: Vec<String>,

    /// Verify the token signature against the provider's JWKS.
    pub verify_token: bool,

    /// Keep retrying provider discovery until `max_attempts` is reached.
    pub retry: bool,

    /// Maximum number of discovery attempts when `retry` is set.
    pub max_attempts: u32,

    /// Delay between discovery attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// Timeout for each call to the provider in seconds.
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_url: "http://localhost:8024".to_string(),
            realm: "theolab".to_string(),
            client_id: "qwb-api".to_string(),
            on_load: OnLoad::default(),
            grant: GrantConfig::default(),
            algorithms: vec!["RS256".to_string()],
            verify_token: true,
            retry: false,
            max_attempts: 500,
            retry_delay_ms: 5000,
            timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human readable output.
    pub json: bool,

    /// Record bootstrap and navigation counters.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_enabled: true,
        }
    }
}
