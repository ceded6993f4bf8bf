//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: query-string DTOs and their mapping to domain filters
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs` and the tests).
pub fn build_app(services: AppServices) -> Router {
    let services = Arc::new(services);

    Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(services)),
        )
}
