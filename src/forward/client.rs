//! Shared upstream HTTP client.

use axum::http::{header::InvalidHeaderValue, HeaderValue};
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::forward::error::ForwardError;
use crate::forward::outbound::spoofed_headers;
use crate::forward::target::ForwardTarget;

/// Error building the upstream client at startup.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("user agent is not a valid header value: {0}")]
    UserAgent(#[from] InvalidHeaderValue),
}

/// Issues the single spoofed GET per proxied request.
///
/// Cheap to clone; the connection pool inside `reqwest::Client` is shared.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    user_agent: HeaderValue,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientBuildError> {
        let mut builder = reqwest::Client::builder()
            .no_proxy()
            // Redirect hops must keep the spoofed Referer, not the hop URL.
            .referer(false)
            .redirect(Policy::limited(config.max_redirects));
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            user_agent: HeaderValue::from_str(&config.user_agent)?,
        })
    }

    /// Fetch `target` once. Non-2xx statuses are returned, not raised.
    pub async fn fetch(
        &self,
        target: &ForwardTarget,
        range: Option<&HeaderValue>,
    ) -> Result<reqwest::Response, ForwardError> {
        let headers = spoofed_headers(&self.user_agent, target, range)?;

        let response = self
            .client
            .get(target.url.clone())
            .headers(headers)
            .send()
            .await?;

        Ok(response)
    }
}
