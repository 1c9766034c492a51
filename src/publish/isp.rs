//! Geolocation / ISP lookup for the link's display label.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Label used whenever the lookup fails.
pub const FALLBACK_ISP_LABEL: &str = "Unknown-ISP";
/// Default lookup endpoint.
pub const IPAPI_ENDPOINT: &str = "https://ipapi.co/json/";
/// Fixed timeout of the lookup request.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum IspLookupError {
    #[error("lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}

/// Resolves `<country>-<org>` for the host's public address.
#[async_trait]
pub trait IspLookup: Send + Sync {
    async fn lookup(&self) -> Result<String, IspLookupError>;
}

/// The lookup label, or [`FALLBACK_ISP_LABEL`] on any failure.
pub async fn isp_label_or_fallback(lookup: &dyn IspLookup) -> String {
    match lookup.lookup().await {
        Ok(label) => label,
        Err(e) => {
            tracing::warn!(error = %e, fallback = FALLBACK_ISP_LABEL, "ISP lookup failed");
            FALLBACK_ISP_LABEL.to_string()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct IpApiResponse {
    country_code: Option<String>,
    org: Option<String>,
}

impl IpApiResponse {
    fn label(&self) -> String {
        format!(
            "{}-{}",
            self.country_code.as_deref().unwrap_or("Unknown"),
            self.org.as_deref().unwrap_or("ISP")
        )
        .replace(' ', "_")
    }
}

/// [`IspLookup`] against an ipapi.co compatible JSON endpoint.
#[derive(Debug, Clone)]
pub struct IpApiLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl IpApiLookup {
    pub fn new() -> Result<Self, IspLookupError> {
        Self::with_endpoint(IPAPI_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, IspLookupError> {
        let client = reqwest::Client::builder().timeout(LOOKUP_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl IspLookup for IpApiLookup {
    async fn lookup(&self) -> Result<String, IspLookupError> {
        let response = self.client.get(&self.endpoint).send().await?;
        if !response.status().is_success() {
            return Err(IspLookupError::Unavailable(format!("status {}", response.status())));
        }
        let body: IpApiResponse = response.json().await?;
        Ok(body.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_replaces_spaces() {
        let response: IpApiResponse =
            serde_json::from_str(r#"{"ip":"203.0.113.9","country_code":"DE","org":"Hetzner Online GmbH"}"#)
                .unwrap();
        assert_eq!(response.label(), "DE-Hetzner_Online_GmbH");
    }

    #[test]
    fn test_label_defaults_for_missing_fields() {
        assert_eq!(IpApiResponse::default().label(), "Unknown-ISP");

        let response: IpApiResponse = serde_json::from_str(r#"{"country_code":"US"}"#).unwrap();
        assert_eq!(response.label(), "US-ISP");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        let lookup = IpApiLookup::with_endpoint("http://127.0.0.1:1/json/").unwrap();
        assert_eq!(isp_label_or_fallback(&lookup).await, FALLBACK_ISP_LABEL);
    }
}
