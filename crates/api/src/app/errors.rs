use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{error, warn};

use catalog_core::DomainError;
use catalog_infra::StoreError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            warn!(%msg, "rejected invalid product data");
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(e) => domain_error_to_response(e),
        StoreError::Database(msg) => {
            error!(%msg, "product store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
        StoreError::Corrupt(msg) => {
            error!(%msg, "corrupt product record");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    let message = rejection.body_text();
    warn!(%message, "rejected request body");
    match rejection {
        JsonRejection::MissingJsonContentType(_) => json_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_media_type",
            "Content-Type must be application/json",
        ),
        JsonRejection::JsonDataError(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        _ => json_error(StatusCode::BAD_REQUEST, "bad_request", message),
    }
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    let message = rejection.body_text();
    warn!(%message, "rejected query string");
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

pub fn path_rejection_to_response(rejection: PathRejection) -> axum::response::Response {
    let message = rejection.body_text();
    warn!(%message, "rejected path parameter");
    json_error(StatusCode::BAD_REQUEST, "invalid_id", message)
}

pub fn product_not_found(id: impl core::fmt::Display) -> axum::response::Response {
    json_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("product with id '{id}' was not found"),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
