//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, one route per endpoint)
//!     → request.rs (add request ID)
//!     → forward::Endpoint (resolve, fetch, relay)
//!     → Send to client
//! ```

pub mod health;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
