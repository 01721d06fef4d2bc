//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (user agent non-empty, ports valid)
//! - Detect conflicting endpoint paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{EndpointConfig, ProxyConfig};
use crate::http::health::HEALTH_PATH;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no endpoints configured")]
    NoEndpoints,

    #[error("endpoint '{0}' has an empty name")]
    EmptyName(String),

    #[error("endpoint '{name}' path '{path}' must start with '/'")]
    RelativePath { name: String, path: String },

    #[error("endpoint '{name}' path '{path}' uses route parameters or wildcards")]
    PatternPath { name: String, path: String },

    #[error("endpoint '{0}' uses the reserved health check path")]
    ReservedPath(String),

    #[error("endpoint path '{0}' is declared more than once")]
    DuplicatePath(String),

    #[error("endpoint '{name}' fixed_referer '{referer}' is not a valid URL")]
    InvalidFixedReferer { name: String, referer: String },

    #[error("endpoint '{0}' has an empty missing_url_message")]
    EmptyMissingUrlMessage(String),

    #[error("upstream user_agent must not be empty")]
    EmptyUserAgent,

    #[error("upstream user_agent is not a valid header value")]
    InvalidUserAgent,

    #[error("observability metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let user_agent = config.upstream.user_agent.trim();
    if user_agent.is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    } else if axum::http::HeaderValue::from_str(user_agent).is_err() {
        errors.push(ValidationError::InvalidUserAgent);
    }

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    let mut seen = HashSet::new();
    for endpoint in &config.endpoints {
        validate_endpoint(endpoint, &mut errors);
        if !seen.insert(endpoint.path.as_str()) {
            errors.push(ValidationError::DuplicatePath(endpoint.path.clone()));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_endpoint(endpoint: &EndpointConfig, errors: &mut Vec<ValidationError>) {
    if endpoint.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName(endpoint.path.clone()));
    }

    if !endpoint.path.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            name: endpoint.name.clone(),
            path: endpoint.path.clone(),
        });
    }

    let patterned = endpoint.path.contains(['{', '}'])
        || endpoint
            .path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'));
    if patterned {
        errors.push(ValidationError::PatternPath {
            name: endpoint.name.clone(),
            path: endpoint.path.clone(),
        });
    }

    if endpoint.path == HEALTH_PATH {
        errors.push(ValidationError::ReservedPath(endpoint.name.clone()));
    }

    if let Some(referer) = &endpoint.fixed_referer {
        if url::Url::parse(referer).is_err() {
            errors.push(ValidationError::InvalidFixedReferer {
                name: endpoint.name.clone(),
                referer: referer.clone(),
            });
        }
    }

    if endpoint.missing_url_message.is_empty() {
        errors.push(ValidationError::EmptyMissingUrlMessage(endpoint.name.clone()));
    }
}
