//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Accounts
//! POST /users/signup/user         - Register a shopper          (public, rate-limited)
//! POST /users/signup/vendor       - Register a vendor           (public, rate-limited)
//! POST /users/signup/contributor  - Register a contributor      (public, rate-limited)
//! POST /users/login               - Login                       (public, rate-limited)
//! POST /users/logout              - Logout                      (any role)
//! GET  /users/auth                - Session status              (any role)
//!
//! # Shops
//! POST   /shops/create_shop       - Create a shop               (vendor, admin)
//! PATCH  /shops/update_shop       - Update a shop               (vendor, admin)
//! GET    /shops/view_shop         - List shops by owner         (any role)
//! GET    /shops/{shop_id}         - Fetch one shop              (any role)
//! DELETE /shops/{shop_id}         - Delete a shop               (admin)
//!
//! # Items
//! POST   /items/add_item              - Add an item             (vendor, admin)
//! GET    /items/get_all_items         - Paginated listing       (any role)
//! GET    /items/get_item/{item_name}  - Fetch one item          (any role)
//! PATCH  /items/update_item           - Update an item          (vendor, admin)
//! DELETE /items/delete_item           - Delete an item          (vendor, admin)
//!
//! # Inventory
//! POST   /inventory/add               - Add stock               (vendor, admin)
//! PATCH  /inventory/update            - Update stock            (vendor, admin)
//! GET    /inventory/{inventory_id}    - Fetch one row           (any role)
//! GET    /inventory/shop/{shop_id}    - List a shop's stock     (any role)
//! DELETE /inventory/{inventory_id}    - Delete a row            (vendor, admin)
//!
//! # Search
//! GET /search/nearby              - Nearby items                (public)
//!
//! # Status
//! GET /status/health              - Health check                (public)
//! GET /status/info                - App info                    (public)
//! ```

pub mod auth;
pub mod inventory;
pub mod items;
pub mod search;
pub mod shops;
pub mod status;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    routing::{delete, get, patch, post},
};
use serde_json::Value;

use crate::error::AppError;
use crate::middleware::{ADMIN_ONLY, ANY_ROLE, VENDOR_ROLES, auth_rate_limiter, require_roles};
use crate::state::AppState;

/// Serialize a value into a response body.
pub(crate) fn to_body<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

/// The empty `{}` body.
pub(crate) fn empty_body() -> Value {
    Value::Object(serde_json::Map::new())
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/signup/user", post(auth::signup_user))
        .route("/signup/vendor", post(auth::signup_vendor))
        .route("/signup/contributor", post(auth::signup_contributor))
        .route("/login", post(auth::login))
        .route_layer(auth_rate_limiter());

    let gated = Router::new()
        .route("/logout", post(auth::logout))
        .route("/auth", get(auth::auth_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |state: State<AppState>, request: Request, next: Next| {
                require_roles(state, ANY_ROLE, request, next)
            },
        ));

    public.merge(gated)
}

fn shop_routes(state: &AppState) -> Router<AppState> {
    let vendor = Router::new()
        .route("/create_shop", post(shops::create_shop))
        .route("/update_shop", patch(shops::update_shop))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |state: State<AppState>, request: Request, next: Next| {
                require_roles(state, VENDOR_ROLES, request, next)
            },
        ));

    let admin = Router::new()
        .route("/{shop_id}", delete(shops::delete_shop))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |state: State<AppState>, request: Request, next: Next| {
                require_roles(state, ADMIN_ONLY, request, next)
            },
        ));

    let readers = Router::new()
        .route("/view_shop", get(shops::view_shop))
        .route("/{shop_id}", get(shops::get_shop))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |state: State<AppState>, request: Request, next: Next| {
                require_roles(state, ANY_ROLE, request, next)
            },
        ));

    vendor.merge(admin).merge(readers)
}

fn item_routes(state: &AppState) -> Router<AppState> {
    let vendor = Router::new()
        .route("/add_item", post(items::add_item))
        .route("/update_item", patch(items::update_item))
        .route("/delete_item", delete(items::delete_item))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |state: State<AppState>, request: Request, next: Next| {
                require_roles(state, VENDOR_ROLES, request, next)
            },
        ));

    let readers = Router::new()
        .route("/get_all_items", get(items::get_all_items))
        .route("/get_item/{item_name}", get(items::get_item))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |state: State<AppState>, request: Request, next: Next| {
                require_roles(state, ANY_ROLE, request, next)
            },
        ));

    vendor.merge(readers)
}

fn inventory_routes(state: &AppState) -> Router<AppState> {
    let vendor = Router::new()
        .route("/add", post(inventory::add_inventory))
        .route("/update", patch(inventory::update_inventory))
        .route("/{inventory_id}", delete(inventory::delete_inventory))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |state: State<AppState>, request: Request, next: Next| {
                require_roles(state, VENDOR_ROLES, request, next)
            },
        ));

    let readers = Router::new()
        .route("/{inventory_id}", get(inventory::get_inventory))
        .route("/shop/{shop_id}", get(inventory::inventory_for_shop))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |state: State<AppState>, request: Request, next: Next| {
                require_roles(state, ANY_ROLE, request, next)
            },
        ));

    vendor.merge(readers)
}

fn search_routes() -> Router<AppState> {
    Router::new().route("/nearby", get(search::nearby))
}

fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(status::health))
        .route("/info", get(status::info))
}

/// Create all routes for the marketplace service.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes(state))
        .nest("/shops", shop_routes(state))
        .nest("/items", item_routes(state))
        .nest("/inventory", inventory_routes(state))
        .nest("/search", search_routes())
        .nest("/status", status_routes())
}
