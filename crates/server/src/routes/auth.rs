//! Account and session handlers.

use axum::extract::{Json, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use serde_json::Value;

use crate::error::{AppError, json_response};
use crate::middleware::{CurrentSession, RequestMeta};
use crate::services::auth::{LoginRequest, RegisterUserRequest, RegisterVendorRequest};
use crate::services::auth as auth_service;
use crate::state::AppState;

use super::{empty_body, to_body};

/// `POST /users/signup/user`
pub async fn signup_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Response, AppError> {
    let user = auth_service::register_user(&state, request).await?;
    Ok(json_response(
        "User registered successfully",
        StatusCode::CREATED,
        to_body(&user)?,
    ))
}

/// `POST /users/signup/vendor`
pub async fn signup_vendor(
    State(state): State<AppState>,
    Json(request): Json<RegisterVendorRequest>,
) -> Result<Response, AppError> {
    let vendor = auth_service::register_vendor(&state, request).await?;
    Ok(json_response(
        "Vendor registered successfully",
        StatusCode::CREATED,
        to_body(&vendor)?,
    ))
}

/// `POST /users/signup/contributor`
pub async fn signup_contributor(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Response, AppError> {
    let contributor = auth_service::register_contributor(&state, request).await?;
    Ok(json_response(
        "Contributor registered successfully",
        StatusCode::CREATED,
        to_body(&contributor)?,
    ))
}

/// `POST /users/login`
pub async fn login(
    State(state): State<AppState>,
    meta: RequestMeta,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let outcome = auth_service::login(&state, request, meta).await?;

    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        state.config().cookie_key,
        outcome.session.token,
        outcome.max_age_seconds
    );

    let mut response = json_response(
        "User logged in successfully",
        StatusCode::OK,
        Value::Array(Vec::new()),
    );
    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.to_string()))?,
    );
    Ok(response)
}

/// `POST /users/logout`
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    auth_service::logout(&state, &session).await?;

    // expire the cookie immediately
    let cookie = format!(
        "{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax",
        state.config().cookie_key
    );

    let mut response = json_response("Logged out successfully", StatusCode::OK, empty_body());
    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.to_string()))?,
    );
    Ok(response)
}

/// `GET /users/auth`
pub async fn auth_status(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let user = auth_service::auth_status(&state, &session).await?;
    Ok(json_response(
        "Session is valid.",
        StatusCode::OK,
        to_body(&user)?,
    ))
}
