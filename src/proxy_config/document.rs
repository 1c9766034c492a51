//! Front process configuration document.
//!
//! Field names follow the front binary's JSON schema (camelCase), so every
//! struct here serializes straight into `config.json`.

use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;

/// Inbound protocol identifier shared by the front config and the link.
pub const PROTOCOL: &str = "vless";
/// Flow control attached to the public inbound's client.
pub const VISION_FLOW: &str = "xtls-rprx-vision";
/// WebSocket path of the encrypted fallback listener.
pub const WS_PATH: &str = "/vla";
/// Loopback port of the plain-TCP fallback listener.
pub const TCP_FALLBACK_PORT: u16 = 3001;
/// Loopback port of the WebSocket fallback listener.
pub const WS_FALLBACK_PORT: u16 = 3002;

const LOOPBACK: &str = "127.0.0.1";
const DOH_RESOLVER: &str = "https+local://8.8.8.8/dns-query";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfigDocument {
    pub log: LogSettings,
    pub inbounds: Vec<Inbound>,
    pub dns: DnsSettings,
    pub outbounds: Vec<Outbound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    pub access: String,
    pub error: String,
    pub loglevel: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbound {
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
    pub protocol: String,
    pub settings: InboundSettings,
    pub stream_settings: StreamSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sniffing: Option<Sniffing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundSettings {
    pub clients: Vec<InboundClient>,
    pub decryption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallbacks: Option<Vec<Fallback>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_auth: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundClient {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
}

/// Where the public inbound forwards traffic it does not terminate itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fallback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub dest: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSettings {
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_settings: Option<WsSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsSettings {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sniffing {
    pub enabled: bool,
    pub dest_override: Vec<String>,
    pub metadata_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsSettings {
    pub servers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbound {
    pub protocol: String,
    pub tag: String,
}

impl ProxyConfigDocument {
    /// Build the front configuration for `config`.
    ///
    /// One public inbound on `front_port` with two loopback fallbacks: plain
    /// TCP and an encrypted WebSocket listener.
    pub fn from_service_config(config: &ServiceConfig) -> Self {
        let client = |flow: Option<&str>| InboundClient {
            id: config.uid.clone(),
            flow: flow.map(str::to_string),
        };

        let public = Inbound {
            port: config.front_port,
            listen: None,
            protocol: PROTOCOL.to_string(),
            settings: InboundSettings {
                clients: vec![client(Some(VISION_FLOW))],
                decryption: "none".to_string(),
                fallbacks: Some(vec![
                    Fallback {
                        path: None,
                        dest: TCP_FALLBACK_PORT,
                    },
                    Fallback {
                        path: Some(WS_PATH.to_string()),
                        dest: WS_FALLBACK_PORT,
                    },
                ]),
                selected_auth: None,
            },
            stream_settings: StreamSettings {
                network: "tcp".to_string(),
                security: None,
                ws_settings: None,
            },
            sniffing: None,
        };

        let tcp_fallback = Inbound {
            port: TCP_FALLBACK_PORT,
            listen: Some(LOOPBACK.to_string()),
            protocol: PROTOCOL.to_string(),
            settings: InboundSettings {
                clients: vec![client(None)],
                decryption: "none".to_string(),
                fallbacks: None,
                selected_auth: None,
            },
            stream_settings: StreamSettings {
                network: "tcp".to_string(),
                security: Some("none".to_string()),
                ws_settings: None,
            },
            sniffing: None,
        };

        let ws_fallback = Inbound {
            port: WS_FALLBACK_PORT,
            listen: Some(LOOPBACK.to_string()),
            protocol: PROTOCOL.to_string(),
            settings: InboundSettings {
                clients: vec![client(None)],
                decryption: config.server_decryption.clone(),
                fallbacks: None,
                selected_auth: Some(config.auth_label.clone()),
            },
            stream_settings: StreamSettings {
                network: "ws".to_string(),
                security: Some("none".to_string()),
                ws_settings: Some(WsSettings {
                    path: WS_PATH.to_string(),
                }),
            },
            sniffing: Some(Sniffing {
                enabled: true,
                dest_override: vec!["http".into(), "tls".into(), "quic".into()],
                metadata_only: false,
            }),
        };

        Self {
            log: LogSettings {
                access: "/dev/null".to_string(),
                error: "/dev/null".to_string(),
                loglevel: "none".to_string(),
            },
            inbounds: vec![public, tcp_fallback, ws_fallback],
            dns: DnsSettings {
                servers: vec![DOH_RESOLVER.to_string()],
            },
            outbounds: vec![
                Outbound {
                    protocol: "freedom".to_string(),
                    tag: "direct".to_string(),
                },
                Outbound {
                    protocol: "blackhole".to_string(),
                    tag: "block".to_string(),
                },
            ],
        }
    }
}
