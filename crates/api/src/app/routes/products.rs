use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use catalog_core::ProductId;
use catalog_products::{NewProduct, ProductPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn parse_id(
    path: Result<Path<String>, PathRejection>,
) -> Result<ProductId, axum::response::Response> {
    let Path(raw) = path.map_err(errors::path_rejection_to_response)?;
    raw.parse::<ProductId>()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let draft = match NewProduct::from_json(body) {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let product = match services.store().create(draft).await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };

    let id = product.id_typed();
    info!(product_id = %id, name = product.name(), "product created");

    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/products/{id}"))],
        Json(product),
    )
        .into_response()
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().find(id).await {
        Ok(Some(product)) => {
            debug!(product_id = %id, "fetched product");
            (StatusCode::OK, Json(product)).into_response()
        }
        Ok(None) => errors::product_not_found(id),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let patch = match ProductPatch::from_json(body) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().update(id, patch).await {
        Ok(Some(product)) => {
            info!(product_id = %id, "product updated");
            (StatusCode::OK, Json(product)).into_response()
        }
        Ok(None) => errors::product_not_found(id),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().delete(id).await {
        Ok(removed) => {
            info!(product_id = %id, removed, "product deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListProductsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().query(&filter).await {
        Ok(items) => {
            debug!(?filter, count = items.len(), "listed products");
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
