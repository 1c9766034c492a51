//! Subscription link publication.
//!
//! # Data Flow
//! ```text
//! discovered domain
//!     + isp.rs (geo lookup, falls back to "Unknown-ISP")
//!     + static link parameters from ServiceConfig
//!     → link.rs (descriptor URI → newline → base64)
//!     → RunContext (visible to HTTP readers)
//!     → <work_dir>/sub.txt (best effort)
//! ```
//!
//! # Design Decisions
//! - Only an empty domain fails publication; lookup and disk failures degrade
//! - The in-memory copy is published before the disk write

pub mod isp;
pub mod link;

use std::sync::Arc;

use thiserror::Error;
use tokio::fs;

use crate::config::ServiceConfig;
use crate::state::RunContext;

pub use isp::{isp_label_or_fallback, IpApiLookup, IspLookup, FALLBACK_ISP_LABEL};
pub use link::{build_descriptor, SubscriptionArtifact};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("cannot publish a link without a domain")]
    EmptyDomain,
}

/// Result of a publication.
#[derive(Debug, Clone)]
pub struct Publication {
    pub artifact: Arc<SubscriptionArtifact>,
    /// Whether `sub.txt` was written.
    pub persisted: bool,
}

/// Builds, shares and persists the subscription artifact.
pub struct LinkPublisher {
    config: Arc<ServiceConfig>,
    context: Arc<RunContext>,
    isp: Arc<dyn IspLookup>,
}

impl LinkPublisher {
    pub fn new(config: Arc<ServiceConfig>, context: Arc<RunContext>, isp: Arc<dyn IspLookup>) -> Self {
        Self { config, context, isp }
    }

    pub async fn publish(&self, domain: &str) -> Result<Publication, PublishError> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(PublishError::EmptyDomain);
        }

        let isp = isp_label_or_fallback(self.isp.as_ref()).await;
        let descriptor = build_descriptor(&self.config, domain, &isp);
        let artifact = Arc::new(SubscriptionArtifact::from_descriptors([descriptor]));

        self.context.publish_subscription(artifact.clone());

        let path = self.config.subscription_path();
        let persisted = match fs::write(&path, artifact.as_str()).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Subscription saved");
                true
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to persist subscription, serving from memory only"
                );
                false
            }
        };

        tracing::info!(domain, isp = %isp, subscription = artifact.as_str(), "Subscription published");
        Ok(Publication { artifact, persisted })
    }
}
