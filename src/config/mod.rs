//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → FOLIO_* environment overrides
//!     → validation.rs (semantic checks)
//!     → ViewerConfig (validated, immutable)
//!     → handed to the API client, identity client and logging
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_with_env, parse_config, ConfigError};
pub use schema::{ApiConfig, GrantConfig, IdentityConfig, ObservabilityConfig, OnLoad, ViewerConfig};
pub use validation::{validate_config, ValidationError};
