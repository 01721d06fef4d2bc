//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Browser user agent presented to upstream servers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Outbound client settings.
    pub upstream: UpstreamConfig,

    /// Proxy endpoints exposed by the server.
    pub endpoints: Vec<EndpointConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            endpoints: EndpointConfig::defaults(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: IpAddr,

    /// TCP port. Overridden by the `PORT` environment variable.
    pub port: u16,
}

impl ListenerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

/// Settings for the outbound HTTP client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Spoofed `User-Agent` sent with every upstream request.
    pub user_agent: String,

    /// Connection establishment timeout in seconds. Unset means no limit.
    pub connect_timeout_secs: Option<u64>,

    /// Maximum number of redirects followed before giving up.
    pub max_redirects: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: None,
            max_redirects: 10,
        }
    }
}

/// Which upstream response headers are relayed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Relay every end-to-end header.
    PassThrough,
    /// Relay only `Content-Type`.
    ContentType,
}

/// A single proxy endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Endpoint identifier for logging/metrics.
    pub name: String,

    /// Route path, e.g. "/stream_proxy".
    pub path: String,

    /// Response header policy.
    #[serde(default = "default_response_mode")]
    pub response_mode: ResponseMode,

    /// Honor the `ref` query parameter.
    #[serde(default)]
    pub allow_referer_override: bool,

    /// Referer used when no override applies. Falls back to the target origin.
    #[serde(default)]
    pub fixed_referer: Option<String>,

    /// Body of the 400 response when `url` is missing.
    #[serde(default = "default_missing_url_message")]
    pub missing_url_message: String,
}

fn default_response_mode() -> ResponseMode {
    ResponseMode::PassThrough
}

fn default_missing_url_message() -> String {
    "Missing url param".to_string()
}

impl EndpointConfig {
    /// Streaming endpoint: full header pass-through, `ref` honored.
    pub fn stream() -> Self {
        Self {
            name: "stream".to_string(),
            path: "/stream_proxy".to_string(),
            response_mode: ResponseMode::PassThrough,
            allow_referer_override: true,
            fixed_referer: None,
            missing_url_message: "Missing url param".to_string(),
        }
    }

    /// Root endpoint: content type only, referer always derived.
    pub fn root() -> Self {
        Self {
            name: "root".to_string(),
            path: "/".to_string(),
            response_mode: ResponseMode::ContentType,
            allow_referer_override: false,
            fixed_referer: None,
            missing_url_message: "Missing ?url=".to_string(),
        }
    }

    /// Endpoints served when the config file declares none.
    pub fn defaults() -> Vec<Self> {
        vec![Self::stream(), Self::root()]
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.upstream.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.endpoints.len(), 2);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn endpoint_fields_deserialize() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [listener]
            host = "127.0.0.1"
            port = 9000

            [[endpoints]]
            name = "images"
            path = "/img"
            response_mode = "content_type"
            fixed_referer = "https://gallery.example.com/"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.socket_addr().to_string(), "127.0.0.1:9000");
        let endpoint = &config.endpoints[0];
        assert_eq!(endpoint.response_mode, ResponseMode::ContentType);
        assert!(!endpoint.allow_referer_override);
        assert_eq!(endpoint.fixed_referer.as_deref(), Some("https://gallery.example.com/"));
        assert_eq!(endpoint.missing_url_message, "Missing url param");
    }

    #[test]
    fn default_endpoints_cover_both_routes() {
        let endpoints = EndpointConfig::defaults();
        let paths: Vec<_> = endpoints.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["/stream_proxy", "/"]);
        assert_eq!(endpoints[1].missing_url_message, "Missing ?url=");
    }
}
