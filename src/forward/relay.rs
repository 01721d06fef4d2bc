//! Upstream response → client response.
//!
//! Status is always mirrored and the body is streamed through untouched. The
//! response mode decides which headers survive.

use axum::{
    body::Body,
    http::{
        header::{
            CONNECTION, CONTENT_TYPE, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE, TRAILER,
            TRANSFER_ENCODING, UPGRADE,
        },
        HeaderMap, HeaderName, StatusCode,
    },
    response::Response,
};
use futures_util::TryStreamExt;

use crate::config::ResponseMode;

const HOP_BY_HOP_HEADERS: [HeaderName; 8] = [
    CONNECTION,
    HeaderName::from_static("keep-alive"),
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

/// Select the upstream headers relayed under `mode`.
pub fn relayed_headers(mut upstream: HeaderMap, mode: ResponseMode) -> HeaderMap {
    match mode {
        ResponseMode::PassThrough => {
            for name in &HOP_BY_HOP_HEADERS {
                upstream.remove(name);
            }
            upstream
        }
        ResponseMode::ContentType => {
            let mut headers = HeaderMap::new();
            if let Some(value) = upstream.remove(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, value);
            }
            headers
        }
    }
}

/// Turn an upstream response into the client response.
pub fn relay(mut upstream: reqwest::Response, mode: ResponseMode, endpoint: &str) -> Response {
    let status: StatusCode = upstream.status();
    let headers = relayed_headers(std::mem::take(upstream.headers_mut()), mode);

    let endpoint = endpoint.to_string();
    let stream = upstream.bytes_stream().inspect_err(move |e| {
        tracing::warn!(endpoint = %endpoint, error = %e, "Upstream body stream aborted");
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::CONTENT_LENGTH, HeaderValue};

    fn upstream_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("video/mp2t"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1024"));
        headers.insert("accept-ranges", HeaderValue::from_static("bytes"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers
    }

    #[test]
    fn pass_through_strips_hop_by_hop() {
        let headers = relayed_headers(upstream_headers(), ResponseMode::PassThrough);

        assert_eq!(headers[CONTENT_TYPE], "video/mp2t");
        assert_eq!(headers[CONTENT_LENGTH], "1024");
        assert_eq!(headers["accept-ranges"], "bytes");
        assert!(!headers.contains_key(CONNECTION));
        assert!(!headers.contains_key("keep-alive"));
        assert!(!headers.contains_key(TRANSFER_ENCODING));
    }

    #[test]
    fn content_type_mode_keeps_only_content_type() {
        let headers = relayed_headers(upstream_headers(), ResponseMode::ContentType);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[CONTENT_TYPE], "video/mp2t");
    }

    #[test]
    fn content_type_mode_without_content_type_is_empty() {
        let headers = relayed_headers(HeaderMap::new(), ResponseMode::ContentType);
        assert!(headers.is_empty());
    }
}
