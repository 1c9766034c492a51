//! Public hostname discovery.
//!
//! # Data Flow
//! ```text
//! static domain + credential configured → returned immediately
//! otherwise:
//!     boot.log (written by the backend)
//!         → read whole file each attempt
//!         → first https?://<host>.trycloudflare.com
//!     up to PollPolicy::attempts tries, PollPolicy::interval apart
//! ```
//!
//! # Design Decisions
//! - This is the only polling loop in the orchestration path, and it is bounded
//! - A missing or unreadable log counts as a miss for that attempt

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tokio::fs;

use crate::config::ServiceConfig;
use crate::observability::metrics;
use crate::resilience::{poll_until, PollPolicy, Sleeper};

fn tunnel_host_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https?://((?:[A-Za-z0-9-]+\.)+trycloudflare\.com)")
            .expect("tunnel host pattern is valid")
    })
}

/// First quick-tunnel hostname announced in `log`.
pub fn find_tunnel_host(log: &str) -> Option<String> {
    tunnel_host_pattern()
        .captures(log)
        .and_then(|captures| captures.get(1))
        .map(|host| host.as_str().to_string())
}

/// Finds the public hostname the backend is reachable under.
pub struct DomainDiscoverer {
    config: Arc<ServiceConfig>,
    policy: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl DomainDiscoverer {
    pub fn new(config: Arc<ServiceConfig>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            config,
            policy: PollPolicy::default(),
            sleeper,
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// The pinned domain, or the first hostname found in the boot log.
    pub async fn discover(&self) -> Option<String> {
        if let Some((domain, _)) = self.config.static_tunnel() {
            tracing::info!(domain, "Using static domain");
            return Some(domain.to_string());
        }

        let log_path = self.config.boot_log_path();
        let found = poll_until(&self.policy, self.sleeper.as_ref(), |attempt| {
            scan_attempt(log_path.clone(), attempt, self.policy.attempts())
        })
        .await;

        match &found {
            Some(domain) => tracing::info!(domain = %domain, "Tunnel domain discovered"),
            None => tracing::warn!(
                attempts = self.policy.attempts(),
                log = %log_path.display(),
                "No tunnel domain found in backend log"
            ),
        }
        found
    }
}

async fn scan_attempt(path: PathBuf, attempt: u32, attempts: u32) -> Option<String> {
    metrics::record_discovery_attempt();
    let found = scan_log(&path).await;
    if found.is_none() {
        tracing::debug!(attempt, attempts, "Tunnel domain not available yet");
    }
    found
}

async fn scan_log(path: &Path) -> Option<String> {
    match fs::read(path).await {
        Ok(bytes) => find_tunnel_host(&String::from_utf8_lossy(&bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Failed to read backend log");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tunnel_host_in_banner() {
        let log = "\
2024-01-01T00:00:00Z INF Requesting new quick Tunnel on trycloudflare.com...
2024-01-01T00:00:01Z INF |  https://brave-otter-lake.trycloudflare.com                  |
2024-01-01T00:00:02Z INF Registered tunnel connection";
        assert_eq!(
            find_tunnel_host(log).as_deref(),
            Some("brave-otter-lake.trycloudflare.com")
        );
    }

    #[test]
    fn test_find_tunnel_host_takes_first_match() {
        let log = "see http://first.trycloudflare.com/ and https://second.trycloudflare.com";
        assert_eq!(find_tunnel_host(log).as_deref(), Some("first.trycloudflare.com"));
    }

    #[test]
    fn test_find_tunnel_host_ignores_other_hosts() {
        assert!(find_tunnel_host("https://example.com/trycloudflare.com").is_none());
        assert!(find_tunnel_host("no urls at all").is_none());
    }
}
