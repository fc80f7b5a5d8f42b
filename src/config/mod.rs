//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → resolved.rs (derive zero address from the master key)
//!     → Configuration (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Config is an explicit value handed to constructors, never process-wide state
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The zero address is derived, never configured

pub mod loader;
pub mod resolved;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use resolved::Configuration;
pub use schema::{LogFormat, ObservabilityConfig, PollConfig, RetryConfig, SimConfig};
pub use validation::{validate_config, ValidationError};
