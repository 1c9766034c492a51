//! Configuration schema definitions.
//!
//! `ServiceConfig` is resolved once at startup (defaults, optional TOML file,
//! `.env`, process environment) and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default client identifier embedded in the front config and the link.
pub const DEFAULT_UID: &str = "75de94bb-b5cb-4ad4-b72b-251476b36f3a";

/// Default server-side capability blob (front inbound `decryption`).
pub const DEFAULT_SERVER_DECRYPTION: &str = "mlkem768x25519plus.native.600s.ugygldXvD2pi5St4XBlF4Cgd-55qGCdaOrcJsxdIR5aHGFeYh-Dm1BDsSluXrHUmscV5n9_hPJ8zPfBP4HEgaA";

/// Default client-side capability blob (link `encryption` parameter).
pub const DEFAULT_CLIENT_ENCRYPTION: &str = "mlkem768x25519plus.native.0rtt.h7xFrUkiWbhXfCNmehc209OOlXhUaPM-2bgKIQyRRLt7WXmEJFsY64QT8se8HcGNLNkKPlTGS1W5XIgRZfFVuNqATbcyuNa7O9BveTB5GaESadgUsWMCs-ugCyTG3WNonYlL0otGzxMEhnohNnkTnoCchQgVULxZAGZW8oYbaNcS-UUZJGhoSvBbz4gZj8RVqDQhd1ReD1E4IMFd2tANlCANZcyZJKykjPdCrqRxiDsxSHGwB6kB4UikaOEAzCSgXNZcJleylvJVkkg54sh4pnGfC0pXp2GjiZFe_cIFRGJJr4mlaCSHphsvecYzctZQiYw3p4xxxRsCtgpUQ2KWReg6YmZCBDy-ckYg8pNp5LtcZBRWE9nDZKVnbpOqL0s442XLqniTLuI1exkbjMJEz-vLIZSNXDA6DieyFyKOUPtFbjcutoq9QGxICAgmvpGn0Qw_JBVoBsJZqwG43wiBcedwBJotJ_SV7klDZEiF-Nud3OaNcmnJWDcEf3O2BiNknpcKbHmrstg8Y0y5kjtfMrau9NDNoiVidNtKtYwQXHA8ndVo15YutaGKs-N9YCavxYUX62fAunulLJAuc6KsDXs_rDlhrFMfxhumq6kNpZxC0vJsvVSQRcVmd-pi8gseXAUOY_zD2paGv2JEQilTtqlrh9cCn-GCP_cYErud-QSsRyCIz5dpGZdEggrPumAlQ4C5j4JniKYaELScBWQWK6E1Y1SPhQFsLgxJFSC9w0pNmIyfleSEEXcd9uOPdVvF0QpJ04dHHKO4r6ekTkkM4XZc7lp1pTwvB8B-tqmjl9Fu4kcgZ0PCQDqGLeq9U3kJUhBsxLhCH8zNzjtaeGooPZAdw_eCJ8dsQmXByaiAs4ofocko4HEfiWh1urqO5dxJMuS3f7WPs6BWthW5vXCuA3mJ_Go87GUY0XEilpE3OJvNNLiBoidadIFnOFI_fqfGGNhxseEGjdF1cLlEtpdLQjWxxcB1BNudQAdWc6tO1StI0KVQwQeFOYS7v3LK2usU1qQmH6UIbmiN5TtmVxodk8FM3xE6fvZZXON1POM_08KPU8QcoYATmUu_sRaWGrlFmTY59zZNoASc7zPHxJm66ZYOiVFcsSh-pmenuzCCa9UcvUSR-OxLNvi9XoZrWOy6n8iP26gnUmcygTQB0phUajxa6fa_85JF6adgD8ylDXiuGpbOchwokbwGbTUMGwmsBSnKDWKqRffDUPq-pZxQOXuwlblsEWUU87DJFHwI2eVKj9sjYVBzm7onKZpt9yRwCEUajIIggzwDRDQwlPil5MS1vWFd4TsIO4oLtbKrR3YK3Xp-kIeZBUMJBliBJfld0vDJNFMnWKXAE_gPySFO9blD8lGgsHKSSYCgF1VUx6B0nsS1nIPMIFvKB6CwKbeHh0gpR9YepBFm99ZAkRRH2Gu0Xtd59fWoOHRFDYVTWtWTA8gY0oxzE4gcFyePjxw0-7Ax2-gg_fnJZia1fwEAZmZnIAg28OAlRutOPVfLFDBIplSb2NCnsfh6tDcruSt6bZhPlwwDS8pggEKdudxNBkNPYeICnErthTVl5qYB_gQ";

/// Generated front process configuration.
pub const CONFIG_FILE: &str = "config.json";
/// Log written by the backend in quick-tunnel mode.
pub const BOOT_LOG_FILE: &str = "boot.log";
/// Persisted copy of the subscription artifact.
pub const SUBSCRIPTION_FILE: &str = "sub.txt";

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Working directory for executables, generated config and artifacts.
    pub work_dir: PathBuf,

    /// User identifier (UUID) shared by the front config and the link.
    pub uid: String,

    /// Path segment serving the subscription. Falls back to `uid`.
    pub sub_path: Option<String>,

    /// Port of the HTTP surface.
    pub http_port: u16,

    /// Pinned public hostname of a persistent tunnel.
    pub static_domain: Option<String>,

    /// Persistent tunnel credential.
    pub static_credential: Option<String>,

    /// Public port of the front process.
    pub front_port: u16,

    /// Preferred edge host written into the link.
    pub edge_host: String,

    /// Preferred edge port written into the link.
    pub edge_port: u16,

    /// Display name prefix of the link.
    pub name_prefix: String,

    /// Opaque server capability blob.
    pub server_decryption: String,

    /// Opaque client capability blob.
    pub client_encryption: String,

    /// Opaque auth label paired with the server capability.
    pub auth_label: String,

    /// Prometheus exporter bind address; exporter is off when unset.
    pub metrics_address: Option<String>,

    /// Interval of the periodic status report in seconds.
    pub status_interval_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("./tmp"),
            uid: DEFAULT_UID.to_string(),
            sub_path: None,
            http_port: 3005,
            static_domain: None,
            static_credential: None,
            front_port: 8001,
            edge_host: "cf.877774.xyz".to_string(),
            edge_port: 443,
            name_prefix: "Vls".to_string(),
            server_decryption: DEFAULT_SERVER_DECRYPTION.to_string(),
            client_encryption: DEFAULT_CLIENT_ENCRYPTION.to_string(),
            auth_label: "ML-KEM-768, Post-Quantum".to_string(),
            metrics_address: None,
            status_interval_secs: 30,
        }
    }
}

impl ServiceConfig {
    /// Path segment the subscription is served under.
    pub fn sub_path(&self) -> &str {
        self.sub_path.as_deref().unwrap_or(&self.uid)
    }

    /// Pinned domain and credential, when both are configured.
    pub fn static_tunnel(&self) -> Option<(&str, &str)> {
        match (self.static_domain.as_deref(), self.static_credential.as_deref()) {
            (Some(domain), Some(credential)) => Some((domain, credential)),
            _ => None,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.work_dir.join(CONFIG_FILE)
    }

    pub fn boot_log_path(&self) -> PathBuf {
        self.work_dir.join(BOOT_LOG_FILE)
    }

    pub fn subscription_path(&self) -> PathBuf {
        self.work_dir.join(SUBSCRIPTION_FILE)
    }

    /// Location of a downloaded executable.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    /// Working directory as a path reference.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}
