//! Public status endpoints.

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;

use crate::error::json_response;

use super::empty_body;

/// `GET /status/health`
pub async fn health() -> Response {
    json_response("OK", StatusCode::OK, empty_body())
}

/// `GET /status/info`
pub async fn info() -> Response {
    json_response(
        "Localmart API",
        StatusCode::OK,
        json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}
