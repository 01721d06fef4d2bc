//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one route per configured endpoint
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Dispatch requests to the forwarding core
//! - Observability (metrics, correlation IDs)

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{HeaderMap, Request},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::config::ProxyConfig;
use crate::forward::{ClientBuildError, Endpoint, ForwardError, ProxyQuery, UpstreamClient};
use crate::http::health::{self, HEALTH_PATH};
use crate::http::request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
use crate::observability::metrics;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Client(#[from] ClientBuildError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given (validated) configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let client = UpstreamClient::new(&config.upstream)?;
        let router = Self::build_router(&config, client);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, client: UpstreamClient) -> Router {
        let mut router = Router::new().route(HEALTH_PATH, get(health::get_status));

        for endpoint in &config.endpoints {
            tracing::debug!(
                endpoint = %endpoint.name,
                path = %endpoint.path,
                mode = ?endpoint.response_mode,
                "Registering endpoint"
            );
            let state = Endpoint::new(endpoint.clone(), client.clone());
            router = router.route(&endpoint.path, get(proxy_handler).with_state(state));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoints = self.config.endpoints.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request.request_id(),
    )
}

/// Proxy handler shared by every endpoint.
async fn proxy_handler(
    State(endpoint): State<Endpoint>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let query = ProxyQuery::parse(raw_query.as_deref());

    let response = match endpoint.forward(&query, &headers).await {
        Ok(response) => response,
        Err(e) => {
            log_failure(&endpoint, &headers, &e);
            e.into_response()
        }
    };

    metrics::record_request(endpoint.name(), response.status().as_u16(), start_time);
    response
}

fn log_failure(endpoint: &Endpoint, headers: &HeaderMap, error: &ForwardError) {
    match error {
        ForwardError::MissingTarget { .. } => tracing::debug!(
            request_id = %headers.request_id(),
            endpoint = %endpoint.name(),
            "Rejected request without target"
        ),
        _ => tracing::error!(
            request_id = %headers.request_id(),
            endpoint = %endpoint.name(),
            error = %error,
            "Upstream error"
        ),
    }
}
