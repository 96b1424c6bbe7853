//! Nearby-search handler.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::error::{AppError, json_response};
use crate::services::search::{self as search_service, NearbyOutcome, NearbyQuery};
use crate::state::AppState;

use super::to_body;

/// `GET /search/nearby?q=&lat=&lon=&radius_km=`
pub async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Response, AppError> {
    match search_service::nearby_items(&state, query).await? {
        NearbyOutcome::Shops(shops) => Ok(json_response(
            "Nearby shops with the item found.",
            StatusCode::OK,
            to_body(&shops)?,
        )),
        NearbyOutcome::NoMatchingItems => Ok(json_response(
            "No items found matching your query.",
            StatusCode::OK,
            Value::Array(Vec::new()),
        )),
    }
}
