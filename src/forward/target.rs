//! Target resolution: query string → target URL → referer → origin.

use url::{form_urlencoded, Url};

use crate::config::EndpointConfig;
use crate::forward::error::ForwardError;

/// Query parameters accepted by proxy endpoints.
#[derive(Debug, Clone, Default)]
pub struct ProxyQuery {
    /// Target URL to fetch.
    pub url: Option<String>,

    /// Referer override (`ref`).
    pub referer: Option<String>,
}

impl ProxyQuery {
    /// Parse a raw query string. The first occurrence of a repeated key wins;
    /// unknown keys are ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "url" => &mut query.url,
                "ref" => &mut query.referer,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }
}

/// Where the effective referer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefererSource {
    Override,
    Fixed,
    TargetOrigin,
}

/// A fully resolved upstream target with its spoofed identity.
#[derive(Debug, Clone)]
pub struct ForwardTarget {
    pub url: Url,
    pub referer: String,
    pub origin: String,
    pub referer_source: RefererSource,
}

impl ForwardTarget {
    /// Resolve the target for `query` under the rules of `endpoint`.
    pub fn resolve(query: &ProxyQuery, endpoint: &EndpointConfig) -> Result<Self, ForwardError> {
        let raw = non_empty(query.url.as_deref()).ok_or_else(|| ForwardError::MissingTarget {
            message: endpoint.missing_url_message.clone(),
        })?;
        let url = Url::parse(raw).map_err(ForwardError::InvalidTarget)?;

        let explicit = endpoint
            .allow_referer_override
            .then(|| non_empty(query.referer.as_deref()))
            .flatten()
            .map(|r| (r, RefererSource::Override))
            .or_else(|| {
                non_empty(endpoint.fixed_referer.as_deref()).map(|r| (r, RefererSource::Fixed))
            });

        let target = match explicit {
            Some((referer, referer_source)) => {
                let parsed = Url::parse(referer).map_err(ForwardError::InvalidReferer)?;
                Self {
                    origin: parsed.origin().ascii_serialization(),
                    referer: referer.to_string(),
                    referer_source,
                    url,
                }
            }
            None => {
                let origin = url.origin().ascii_serialization();
                Self {
                    referer: format!("{origin}/"),
                    origin,
                    referer_source: RefererSource::TargetOrigin,
                    url,
                }
            }
        };

        Ok(target)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
