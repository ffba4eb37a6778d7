//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FacadeConfig (validated, immutable)
//!     → provider registry + HTTP server built from it at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{check_config, load_config, parse_config, ConfigError};
pub use schema::{
    FacadeConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProviderConfig, ProvidersConfig,
};
