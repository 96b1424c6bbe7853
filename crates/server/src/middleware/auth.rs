//! Role-gate middleware and the `CurrentSession` extractor.
//!
//! The gate is explicit middleware installed per route group, parameterized
//! by the set of roles the group accepts. It runs once per request before the
//! handler: it pulls the session token from the request cookie, authenticates
//! it against the Entity Store, and attaches the resolved session to request
//! extensions for the handler to pick up.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use localmart_core::Role;

use crate::error::json_response;
use crate::models::Session;
use crate::services::auth;
use crate::state::AppState;

/// Every authenticated role.
pub const ANY_ROLE: &[Role] = &[
    Role::User,
    Role::Vendor,
    Role::StateContributor,
    Role::Admin,
    Role::SuperAdmin,
];

/// Roles allowed to mutate shops, items, and inventory.
pub const VENDOR_ROLES: &[Role] = &[Role::Vendor, Role::Admin];

/// Administrator-only operations.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// The session authenticated for the current request.
///
/// Inserted into request extensions by [`require_roles`]; handlers receive it
/// through the extractor impl below.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentSession(session): CurrentSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", session.email)
/// }
/// ```
#[derive(Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            // Reaching here means the route group is missing its gate
            json_response(
                "Unable to process authentication.",
                StatusCode::BAD_REQUEST,
                Value::Object(serde_json::Map::new()),
            )
        })
    }
}

/// Authenticate the request against `allowed` roles, then run the handler.
///
/// Install per route group:
///
/// ```rust,ignore
/// router.route_layer(middleware::from_fn_with_state(
///     state.clone(),
///     |state: State<AppState>, request: Request, next: Next| {
///         require_roles(state, VENDOR_ROLES, request, next)
///     },
/// ))
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    allowed: &'static [Role],
    mut request: Request,
    next: Next,
) -> Response {
    let token = session_token_from_headers(request.headers(), &state.config().cookie_key);

    match auth::authenticate(state.store(), token.as_deref(), allowed).await {
        Ok(session) => {
            request.extensions_mut().insert(CurrentSession(session));
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

/// Pull the session token out of the request cookie header.
#[must_use]
pub fn session_token_from_headers(headers: &HeaderMap, cookie_key: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_value(cookie_header, cookie_key)
}

fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.trim().to_owned())
    })
}
