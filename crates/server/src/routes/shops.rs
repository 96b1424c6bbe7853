//! Shop handlers.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use localmart_core::{ShopId, UserId};

use crate::error::{AppError, json_response};
use crate::middleware::CurrentSession;
use crate::services::Mutation;
use crate::services::shops::{self as shop_service, ShopCreate, ShopUpdate};
use crate::state::AppState;

use super::to_body;

#[derive(Debug, Deserialize)]
pub struct ViewShopQuery {
    pub owner_id: UserId,
}

/// `POST /shops/create_shop`
pub async fn create_shop(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<ShopCreate>,
) -> Result<Response, AppError> {
    let shop = shop_service::create_shop(&state, &session, request).await?;
    Ok(json_response(
        "Shop created successfully",
        StatusCode::CREATED,
        json!({"shop_id": shop.shop_id}),
    ))
}

/// `PATCH /shops/update_shop`
pub async fn update_shop(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<ShopUpdate>,
) -> Result<Response, AppError> {
    match shop_service::update_shop(&state, &session, request).await? {
        Mutation::Applied(shop) => Ok(json_response(
            "Shop updated successfully.",
            StatusCode::OK,
            to_body(&shop)?,
        )),
        Mutation::NoChanges(shop) => Ok(json_response(
            "No changes detected, shop already has provided values",
            StatusCode::OK,
            to_body(&shop)?,
        )),
    }
}

/// `GET /shops/view_shop?owner_id=`
pub async fn view_shop(
    State(state): State<AppState>,
    Query(query): Query<ViewShopQuery>,
) -> Result<Response, AppError> {
    let read = shop_service::shops_by_owner(&state, query.owner_id).await?;
    let message = if read.from_cache {
        "Shops retrieved from cache"
    } else {
        "Shops retrieved from DATABASE"
    };
    Ok(json_response(message, StatusCode::OK, read.body))
}

/// `GET /shops/{shop_id}`
pub async fn get_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<ShopId>,
) -> Result<Response, AppError> {
    let read = shop_service::get_shop(&state, shop_id).await?;
    let message = if read.from_cache {
        "Shop retrieved from cache"
    } else {
        "Shop retrieved"
    };
    Ok(json_response(message, StatusCode::OK, read.body))
}

/// `DELETE /shops/{shop_id}`
pub async fn delete_shop(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(shop_id): Path<ShopId>,
) -> Result<Response, AppError> {
    let deleted = shop_service::delete_shop(&state, &session, shop_id).await?;
    Ok(json_response(
        "Shop deleted successfully.",
        StatusCode::OK,
        to_body(&deleted)?,
    ))
}
