//! Forwarding core shared by every proxy endpoint.
//!
//! # Data Flow
//! ```text
//! ?url=..&ref=.. + Range
//!     → target.rs   (target URL, effective referer, origin)
//!     → outbound.rs (User-Agent, Referer, Origin, Range)
//!     → client.rs   (one GET, no retries)
//!     → relay.rs    (mirror status, filter headers, stream body)
//!
//! Any failure before the upstream response arrives
//!     → error.rs    (400 missing url / 500 "Proxy error: ...")
//! ```
//!
//! # Design Decisions
//! - No validation of scheme or host; the target is fetched as given
//! - Upstream non-2xx statuses pass through unchanged
//! - No shared mutable state; each request is independent

pub mod client;
pub mod error;
pub mod outbound;
pub mod relay;
pub mod target;

use axum::{
    http::{header::RANGE, HeaderMap},
    response::Response,
};

use crate::config::EndpointConfig;

pub use client::{ClientBuildError, UpstreamClient};
pub use error::{ForwardError, PROXY_ERROR_PREFIX};
pub use target::{ForwardTarget, ProxyQuery, RefererSource};

/// One configured endpoint bound to the shared upstream client.
#[derive(Clone)]
pub struct Endpoint {
    pub config: EndpointConfig,
    client: UpstreamClient,
}

impl Endpoint {
    pub fn new(config: EndpointConfig, client: UpstreamClient) -> Self {
        Self { config, client }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Proxy a single request.
    pub async fn forward(
        &self,
        query: &ProxyQuery,
        inbound: &HeaderMap,
    ) -> Result<Response, ForwardError> {
        let target = ForwardTarget::resolve(query, &self.config)?;

        tracing::debug!(
            endpoint = %self.config.name,
            target = %target.url,
            referer = %target.referer,
            referer_source = ?target.referer_source,
            "Forwarding request"
        );

        let upstream = self.client.fetch(&target, inbound.get(RANGE)).await?;

        tracing::debug!(
            endpoint = %self.config.name,
            status = %upstream.status(),
            "Upstream responded"
        );

        Ok(relay::relay(upstream, self.config.response_mode, &self.config.name))
    }
}
