//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceConfig::default()
//!     → loader.rs (optional TOML file, .env, environment)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is loaded once; there is no reload path
//! - All fields have defaults so an empty environment still runs
//! - Validation separates syntactic (serde, integer parsing) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ServiceConfig;
pub use validation::ValidationError;
