//! Forwarding errors and their client-facing responses.

use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Prefix of every 500 body produced by the proxy.
pub const PROXY_ERROR_PREFIX: &str = "Proxy error: ";

/// Errors raised while forwarding a single request.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The `url` query parameter was absent or empty.
    #[error("{message}")]
    MissingTarget { message: String },

    /// The target could not be parsed as an absolute URL.
    #[error("invalid target URL: {0}")]
    InvalidTarget(url::ParseError),

    /// The referer override could not be parsed to derive an origin.
    #[error("invalid referer URL: {0}")]
    InvalidReferer(url::ParseError),

    /// A derived header value contained forbidden bytes.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    /// The upstream request failed before a response arrived.
    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::MissingTarget { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text body sent to the client.
    pub fn body(&self) -> String {
        match self {
            ForwardError::MissingTarget { message } => message.clone(),
            other => format!("{PROXY_ERROR_PREFIX}{other}"),
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_is_a_client_error() {
        let err = ForwardError::MissingTarget {
            message: "Missing ?url=".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), "Missing ?url=");
    }

    #[test]
    fn parse_failures_are_proxy_errors() {
        let err = ForwardError::InvalidTarget(url::ParseError::RelativeUrlWithoutBase);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.body(),
            "Proxy error: invalid target URL: relative URL without a base"
        );
    }

    #[tokio::test]
    async fn into_response_carries_status_and_body() {
        let response = ForwardError::InvalidReferer(url::ParseError::EmptyHost).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(PROXY_ERROR_PREFIX.as_bytes()));
    }
}
