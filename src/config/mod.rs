//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (ProxyConfig::default)
//!     → optional TOML file (loader.rs)
//!     → PORT environment override (loader.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to HttpServer::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    EndpointConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, ResponseMode,
    UpstreamConfig, DEFAULT_USER_AGENT,
};
pub use validation::ValidationError;
