//! Backend (tunnel client) invocation.
//!
//! The backend runs in one of two modes:
//! - token: a persistent tunnel bound to a pinned domain and credential
//! - quick tunnel: an ephemeral tunnel whose hostname is only known from the
//!   log file the backend writes

use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::config::ServiceConfig;

const TOKEN_LENGTH: RangeInclusive<usize> = 120..=250;
const COMMON_ARGS: &[&str] = &[
    "tunnel",
    "--edge-ip-version",
    "auto",
    "--no-autoupdate",
    "--protocol",
    "http2",
];

/// Whether `credential` looks like a persistent tunnel token:
/// 120 to 250 characters from `[A-Za-z0-9=]`.
pub fn is_token_credential(credential: &str) -> bool {
    TOKEN_LENGTH.contains(&credential.len())
        && credential
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'=')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    Token { credential: String },
    QuickTunnel { log_file: PathBuf, origin: String },
}

impl BackendMode {
    /// Token mode needs a pinned domain and a well-formed credential;
    /// anything else falls back to a quick tunnel.
    pub fn select(config: &ServiceConfig) -> Self {
        match config.static_tunnel() {
            Some((_, credential)) if is_token_credential(credential) => BackendMode::Token {
                credential: credential.to_string(),
            },
            _ => BackendMode::QuickTunnel {
                log_file: config.boot_log_path(),
                origin: format!("http://localhost:{}", config.front_port),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BackendMode::Token { .. } => "token",
            BackendMode::QuickTunnel { .. } => "quick_tunnel",
        }
    }

    /// Full argument vector for the backend executable.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = COMMON_ARGS.iter().map(|s| s.to_string()).collect();
        match self {
            BackendMode::Token { credential } => {
                args.extend(["run".to_string(), "--token".to_string(), credential.clone()]);
            }
            BackendMode::QuickTunnel { log_file, origin } => {
                args.extend([
                    "--logfile".to_string(),
                    log_file.display().to_string(),
                    "--loglevel".to_string(),
                    "info".to_string(),
                    "--url".to_string(),
                    origin.clone(),
                ]);
            }
        }
        args
    }
}
