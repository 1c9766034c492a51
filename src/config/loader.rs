//! Configuration loading from disk and the environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::process::backend::is_token_credential;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid integer in `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, overlay and validate the service configuration.
///
/// Defaults come first, then the optional TOML file, then `.env` and the
/// process environment.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => ServiceConfig::default(),
    };

    hydrate_env_file()?;
    apply_env(&mut config, |key| env::var(key).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    if let Some(credential) = config.static_credential.as_deref() {
        if !is_token_credential(credential) {
            tracing::warn!(
                length = credential.len(),
                "Static credential does not look like a tunnel token, quick tunnel mode will be used"
            );
        }
    }

    Ok(config)
}

/// Parse a TOML configuration file.
pub fn load_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment values onto `config`.
///
/// `lookup` resolves a variable name; empty values count as unset.
pub fn apply_env<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key).and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    };

    if let Some(dir) = get("FILE_PATH") {
        config.work_dir = PathBuf::from(dir);
    }
    if let Some(uid) = get("UID") {
        config.uid = uid;
    }
    if let Some(path) = get("S_PATH") {
        config.sub_path = Some(path);
    }
    if let Some(port) = get("SERVER_PORT") {
        config.http_port = parse_port("SERVER_PORT", &port)?;
    } else if let Some(port) = get("PORT") {
        config.http_port = parse_port("PORT", &port)?;
    }
    if let Some(domain) = get("A_DOMAIN") {
        config.static_domain = Some(domain);
    }
    if let Some(credential) = get("A_AUTH") {
        config.static_credential = Some(credential);
    }
    if let Some(port) = get("A_PORT") {
        config.front_port = parse_port("A_PORT", &port)?;
    }
    if let Some(host) = get("CIP") {
        config.edge_host = host;
    }
    if let Some(port) = get("CPORT") {
        config.edge_port = parse_port("CPORT", &port)?;
    }
    if let Some(name) = get("NAME") {
        config.name_prefix = name;
    }
    if let Some(blob) = get("MLKEM_S") {
        config.server_decryption = blob;
    }
    if let Some(blob) = get("MLKEM_C") {
        config.client_encryption = blob;
    }
    if let Some(label) = get("M_AUTH") {
        config.auth_label = label;
    }
    if let Some(addr) = get("METRICS_ADDR") {
        config.metrics_address = Some(addr);
    }
    if let Some(secs) = get("STATUS_INTERVAL") {
        config.status_interval_secs = secs
            .parse()
            .map_err(|source| ConfigError::InvalidNumber {
                key: "STATUS_INTERVAL",
                source,
            })?;
    }

    Ok(())
}

fn parse_port(key: &'static str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidNumber { key, source })
}

/// Load `.env` from the current directory, overriding the process environment.
fn hydrate_env_file() -> Result<(), ConfigError> {
    match dotenvy::dotenv_override() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Ok(())
        }
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err)),
    }
}
