//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and env parsing handle syntax)
//! - Validate value ranges (ports non-zero and distinct)
//! - Reject subscription paths that cannot be routed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - A malformed tunnel credential is not an error here; the backend falls back
//!   to quick-tunnel mode and the loader logs a warning

use thiserror::Error;
use uuid::Uuid;

use crate::config::schema::ServiceConfig;

/// Path segments owned by the HTTP surface itself.
const RESERVED_PATHS: &[&str] = &["status"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("uid `{0}` is not a valid UUID")]
    InvalidUid(String),

    #[error("{0} must not be zero")]
    ZeroPort(&'static str),

    #[error("front_port and http_port both use {0}")]
    PortConflict(u16),

    #[error("sub_path must not be empty")]
    EmptySubPath,

    #[error("sub_path `{0}` must be a single path segment")]
    NestedSubPath(String),

    #[error("sub_path `{0}` contains route syntax")]
    RouteSyntaxInSubPath(String),

    #[error("sub_path `{0}` is reserved")]
    ReservedSubPath(String),

    #[error("name_prefix must not be empty")]
    EmptyNamePrefix,

    #[error("status_interval_secs must not be zero")]
    ZeroStatusInterval,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if Uuid::parse_str(&config.uid).is_err() {
        errors.push(ValidationError::InvalidUid(config.uid.clone()));
    }

    for (name, port) in [
        ("http_port", config.http_port),
        ("front_port", config.front_port),
        ("edge_port", config.edge_port),
    ] {
        if port == 0 {
            errors.push(ValidationError::ZeroPort(name));
        }
    }

    if config.front_port != 0 && config.front_port == config.http_port {
        errors.push(ValidationError::PortConflict(config.front_port));
    }

    let sub_path = config.sub_path();
    if sub_path.is_empty() {
        errors.push(ValidationError::EmptySubPath);
    } else if sub_path.contains('/') {
        errors.push(ValidationError::NestedSubPath(sub_path.to_string()));
    } else if sub_path.contains(['{', '}', '*']) {
        errors.push(ValidationError::RouteSyntaxInSubPath(sub_path.to_string()));
    } else if RESERVED_PATHS.contains(&sub_path) {
        errors.push(ValidationError::ReservedSubPath(sub_path.to_string()));
    }

    if config.name_prefix.trim().is_empty() {
        errors.push(ValidationError::EmptyNamePrefix);
    }

    if config.status_interval_secs == 0 {
        errors.push(ValidationError::ZeroStatusInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
