use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::app::errors;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK" }))
}

pub async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Product Catalog REST API Service",
        "version": env!("CARGO_PKG_VERSION"),
        "paths": ["/products"],
    }))
}

pub async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "resource not found")
}
