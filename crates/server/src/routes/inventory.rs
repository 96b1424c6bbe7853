//! Inventory handlers.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::Response;

use localmart_core::{InventoryId, ShopId};

use crate::error::{AppError, json_response};
use crate::middleware::CurrentSession;
use crate::services::Mutation;
use crate::services::inventory::{self as inventory_service, InventoryCreate, InventoryUpdate};
use crate::state::AppState;

use super::to_body;

/// `POST /inventory/add`
pub async fn add_inventory(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<InventoryCreate>,
) -> Result<Response, AppError> {
    let inventory = inventory_service::add_inventory(&state, &session, request).await?;
    Ok(json_response(
        "Inventory added",
        StatusCode::CREATED,
        to_body(&inventory)?,
    ))
}

/// `PATCH /inventory/update`
pub async fn update_inventory(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<InventoryUpdate>,
) -> Result<Response, AppError> {
    match inventory_service::update_inventory(&state, &session, request).await? {
        Mutation::Applied(inventory) => Ok(json_response(
            "Inventory updated",
            StatusCode::OK,
            to_body(&inventory)?,
        )),
        Mutation::NoChanges(inventory) => Ok(json_response(
            "No changes detected, inventory already has provided values",
            StatusCode::OK,
            to_body(&inventory)?,
        )),
    }
}

/// `GET /inventory/{inventory_id}`
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(inventory_id): Path<InventoryId>,
) -> Result<Response, AppError> {
    let inventory = inventory_service::get_inventory(&state, inventory_id).await?;
    Ok(json_response(
        "Inventory found",
        StatusCode::OK,
        to_body(&inventory)?,
    ))
}

/// `GET /inventory/shop/{shop_id}`
pub async fn inventory_for_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<ShopId>,
) -> Result<Response, AppError> {
    let inventories = inventory_service::inventory_for_shop(&state, shop_id).await?;
    Ok(json_response(
        "Inventories found",
        StatusCode::OK,
        to_body(&inventories)?,
    ))
}

/// `DELETE /inventory/{inventory_id}`
pub async fn delete_inventory(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(inventory_id): Path<InventoryId>,
) -> Result<Response, AppError> {
    let deleted = inventory_service::delete_inventory(&state, &session, inventory_id).await?;
    Ok(json_response(
        "Inventory deleted",
        StatusCode::OK,
        to_body(&deleted)?,
    ))
}
