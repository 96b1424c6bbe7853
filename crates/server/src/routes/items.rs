//! Item handlers.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;

use localmart_core::ShopId;

use crate::error::{AppError, json_response};
use crate::middleware::CurrentSession;
use crate::services::Mutation;
use crate::services::items::{self as item_service, ItemCreate, ItemUpdate};
use crate::state::AppState;

use super::to_body;

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

const fn default_page() -> i64 {
    1
}

const fn default_page_size() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct DeleteItemQuery {
    pub shop_id: ShopId,
    #[serde(rename = "itemName")]
    pub item_name: String,
}

/// `POST /items/add_item`
pub async fn add_item(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<ItemCreate>,
) -> Result<Response, AppError> {
    let item = item_service::add_item(&state, &session, request).await?;
    Ok(json_response(
        "Item added successfully",
        StatusCode::CREATED,
        to_body(&item)?,
    ))
}

/// `GET /items/get_all_items?page=&page_size=`
pub async fn get_all_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Response, AppError> {
    let read = item_service::list_items(&state, query.page, query.page_size).await?;
    let message = if read.from_cache {
        "Items retrieved from cache"
    } else {
        "Items retrieved successfully"
    };
    Ok(json_response(message, StatusCode::OK, read.body))
}

/// `GET /items/get_item/{item_name}`
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_name): Path<String>,
) -> Result<Response, AppError> {
    let read = item_service::get_item(&state, &item_name).await?;
    let message = if read.from_cache {
        "Item retrieved from cache"
    } else {
        "Item retrieved successfully"
    };
    Ok(json_response(message, StatusCode::OK, read.body))
}

/// `PATCH /items/update_item`
pub async fn update_item(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<ItemUpdate>,
) -> Result<Response, AppError> {
    match item_service::update_item(&state, &session, request).await? {
        Mutation::Applied(item) => Ok(json_response(
            "Item updated successfully",
            StatusCode::OK,
            to_body(&item)?,
        )),
        Mutation::NoChanges(item) => Ok(json_response(
            "No changes detected, item already has provided values",
            StatusCode::OK,
            to_body(&item)?,
        )),
    }
}

/// `DELETE /items/delete_item?shop_id=&itemName=`
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<DeleteItemQuery>,
) -> Result<Response, AppError> {
    let deleted =
        item_service::delete_item(&state, &session, query.shop_id, &query.item_name).await?;
    Ok(json_response(
        "Item deleted successfully",
        StatusCode::OK,
        to_body(&deleted)?,
    ))
}
