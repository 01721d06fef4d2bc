//! Outbound request headers.
//!
//! Apart from transport headers the client adds itself (`Host`, `Accept`),
//! the upstream sees the spoofed browser identity (`User-Agent`, `Referer`,
//! `Origin`) and the client's `Range`. Nothing else from the inbound request
//! is forwarded.

use axum::http::{
    header::{ORIGIN, RANGE, REFERER, USER_AGENT},
    HeaderMap, HeaderValue,
};

use crate::forward::error::ForwardError;
use crate::forward::target::ForwardTarget;

/// Build the header set for the upstream request.
///
/// `range` is forwarded verbatim; when absent an empty `Range` header is sent.
pub fn spoofed_headers(
    user_agent: &HeaderValue,
    target: &ForwardTarget,
    range: Option<&HeaderValue>,
) -> Result<HeaderMap, ForwardError> {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(USER_AGENT, user_agent.clone());
    headers.insert(REFERER, HeaderValue::from_str(&target.referer)?);
    headers.insert(ORIGIN, HeaderValue::from_str(&target.origin)?);
    headers.insert(
        RANGE,
        range.cloned().unwrap_or_else(|| HeaderValue::from_static("")),
    );
    Ok(headers)
}
