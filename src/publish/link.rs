//! Connection descriptor and subscription encoding.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use url::form_urlencoded::byte_serialize;

use crate::config::ServiceConfig;
use crate::proxy_config::document::{PROTOCOL, WS_PATH};

/// TLS fingerprint hint advertised to clients.
const FINGERPRINT: &str = "chrome";
/// Early-data query appended to the WebSocket path.
const WS_EARLY_DATA: &str = "?ed=2560";

/// Build the single connection-descriptor URI for `domain`.
///
/// The name prefix is used verbatim; `isp` is expected to be space-free
/// already (see `IpApiResponse::label`).
pub fn build_descriptor(config: &ServiceConfig, domain: &str, isp: &str) -> String {
    let path: String = byte_serialize(format!("{WS_PATH}{WS_EARLY_DATA}").as_bytes()).collect();
    let label = format!("{}-{}", config.name_prefix, isp);

    format!(
        "{PROTOCOL}://{uid}@{host}:{port}?encryption={encryption}&security=tls&sni={domain}&fp={FINGERPRINT}&type=ws&host={domain}&path={path}#{label}",
        uid = config.uid,
        host = config.edge_host,
        port = config.edge_port,
        encryption = config.client_encryption,
    )
}

/// The base64 subscription payload clients import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionArtifact {
    encoded: String,
}

impl SubscriptionArtifact {
    /// Encode descriptor lines, each newline-terminated.
    pub fn from_descriptors<I, S>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut plain = String::new();
        for descriptor in descriptors {
            plain.push_str(descriptor.as_ref());
            plain.push('\n');
        }
        Self {
            encoded: BASE64.encode(plain),
        }
    }

    /// Wrap an already encoded payload, e.g. one read back from disk.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self {
            encoded: encoded.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Decoded descriptor lines.
    pub fn descriptors(&self) -> Result<Vec<String>, base64::DecodeError> {
        let bytes = BASE64.decode(self.encoded.trim())?;
        Ok(String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect())
    }
}
