//! Authentication: signup, login, logout, and session validation.
//!
//! Sessions are first-class store records: an opaque random token maps to an
//! email and a role snapshot taken at login. Validation is a two-outcome
//! state machine - a session is either valid or absent/expired, and an
//! expired row is deleted the first time it is seen (lazy expiry, no
//! background sweeper).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use localmart_core::{Email, Role, SessionToken, UserId};

use crate::db::{EntityKind, EntityStore, Filter, Filters, Record, StoreError};
use crate::error::{AppError, json_response};
use crate::middleware::RequestMeta;
use crate::models::{Session, User};
use crate::state::AppState;

use super::{find_user_by_email, resolve_session_user, validate_address, validate_contact,
    validate_full_name, validate_shop_name};

/// Session lifetime with "keep me logged in" (30 days).
const KEEP_LOGIN_SECONDS: i64 = 3600 * 24 * 30;

/// Default session lifetime (90 hours).
const DEFAULT_LOGIN_SECONDS: i64 = 3600 * 90;

/// Password special characters accepted by the strength check.
const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

// =============================================================================
// Session validation
// =============================================================================

/// Why a request failed authentication.
#[derive(Debug)]
pub enum AuthRejection {
    /// No session token on the request.
    MissingToken,
    /// Token present but no matching session row.
    InvalidSession,
    /// Session found but past its expiry; the row has been deleted.
    SessionExpired,
    /// Session valid but its snapshotted role is not in the allow-list.
    /// The credential stays valid for other endpoints.
    Forbidden,
    /// Persistence fault while validating.
    Store(StoreError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let empty = Value::Object(serde_json::Map::new());
        match self {
            Self::MissingToken => json_response(
                "Authentication token not provided.",
                StatusCode::UNAUTHORIZED,
                empty,
            ),
            Self::InvalidSession => json_response(
                "Session expired or invalid. Please login again.",
                StatusCode::UNAUTHORIZED,
                empty,
            ),
            Self::SessionExpired => json_response(
                "Session expired. Please login again.",
                StatusCode::UNAUTHORIZED,
                empty,
            ),
            Self::Forbidden => json_response(
                "You do not have permission to access this resource.",
                StatusCode::FORBIDDEN,
                empty,
            ),
            Self::Store(error) => {
                tracing::error!(%error, "store fault during authentication");
                json_response(
                    "Error during authentication.",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    empty,
                )
            }
        }
    }
}

/// Validate a session token against the Entity Store.
///
/// 1. No token -> [`AuthRejection::MissingToken`].
/// 2. No matching session -> [`AuthRejection::InvalidSession`].
/// 3. Past expiry -> delete the row, [`AuthRejection::SessionExpired`].
/// 4. Snapshotted role not in `allowed` -> [`AuthRejection::Forbidden`],
///    session kept.
/// 5. Otherwise the session is returned for the rest of the request.
///
/// # Errors
///
/// Returns an `AuthRejection` describing which step failed.
pub async fn authenticate(
    store: &EntityStore,
    token: Option<&str>,
    allowed: &[Role],
) -> Result<Session, AuthRejection> {
    let Some(token) = token else {
        return Err(AuthRejection::MissingToken);
    };

    let identifier: Filters = vec![("token", Filter::equals(token))];
    let record = store
        .get_one(EntityKind::Session, &identifier)
        .await
        .map_err(AuthRejection::Store)?;

    let Some(Record::Session(session)) = record else {
        return Err(AuthRejection::InvalidSession);
    };

    if session.is_expired(Utc::now()) {
        store
            .delete_by_identifier(EntityKind::Session, &identifier)
            .await
            .map_err(AuthRejection::Store)?;
        return Err(AuthRejection::SessionExpired);
    }

    if !allowed.contains(&session.role) {
        return Err(AuthRejection::Forbidden);
    }

    Ok(session)
}

// =============================================================================
// Signup
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterVendorRequest {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "shopName")]
    pub shop_name: String,
    pub address: String,
    pub contact: Option<String>,
}

/// Register a regular shopper account.
///
/// # Errors
///
/// Validation failures, duplicate email (conflict), or a store fault.
pub async fn register_user(state: &AppState, request: RegisterUserRequest) -> Result<User, AppError> {
    signup(
        state,
        Role::User,
        &request.full_name,
        &request.email,
        &request.password,
        None,
    )
    .await
}

/// Register a vendor account.
///
/// The declared shop details are validated and kept on the account note;
/// the shop itself is created later through the shops API.
///
/// # Errors
///
/// Validation failures, duplicate email (conflict), or a store fault.
pub async fn register_vendor(
    state: &AppState,
    request: RegisterVendorRequest,
) -> Result<User, AppError> {
    let shop_name = validate_shop_name(&request.shop_name)?;
    let address = validate_address(&request.address)?;
    let contact = match request.contact.as_deref() {
        Some(raw) => Some(validate_contact(raw)?),
        None => None,
    };

    let note = format!(
        "Shop: {shop_name}, Address: {address}, Contact: {}",
        contact.as_deref().unwrap_or("None")
    );

    signup(
        state,
        Role::Vendor,
        &request.full_name,
        &request.email,
        &request.password,
        Some(note),
    )
    .await
}

/// Register a state-contributor account.
///
/// # Errors
///
/// Validation failures, duplicate email (conflict), or a store fault.
pub async fn register_contributor(
    state: &AppState,
    request: RegisterUserRequest,
) -> Result<User, AppError> {
    signup(
        state,
        Role::StateContributor,
        &request.full_name,
        &request.email,
        &request.password,
        None,
    )
    .await
}

async fn signup(
    state: &AppState,
    role: Role,
    full_name: &str,
    email: &str,
    password: &str,
    note: Option<String>,
) -> Result<User, AppError> {
    let full_name = validate_full_name(full_name)?;
    let email = Email::parse(email).map_err(|e| AppError::Validation(e.to_string()))?;
    validate_password_strength(password).map_err(AppError::Validation)?;

    let store = state.store();
    if find_user_by_email(store, &email).await?.is_some() {
        return Err(AppError::Conflict(
            "Email already registered, Please try again".to_owned(),
        ));
    }

    let user = User {
        id: UserId::generate(),
        email,
        password_hash: hash_password(password)?,
        role,
        full_name: Some(full_name),
        created_at: Utc::now(),
        updated_at: None,
        note,
    };

    let mut tx = store.begin().await?;
    store.insert(&mut *tx, &Record::User(user.clone())).await?;
    tx.commit().await.map_err(StoreError::Database)?;

    tracing::info!(email = %user.email, role = %user.role, "account registered");
    Ok(user)
}

// =============================================================================
// Login / logout
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "keepLogin", default)]
    pub keep_login: bool,
}

/// A freshly created session plus the cookie lifetime to hand the client.
#[derive(Debug)]
pub struct LoginOutcome {
    pub session: Session,
    pub max_age_seconds: i64,
}

/// Verify credentials and create a session with a role snapshot.
///
/// # Errors
///
/// `Unauthorized` for unknown accounts or wrong passwords; store faults
/// otherwise.
pub async fn login(
    state: &AppState,
    request: LoginRequest,
    meta: RequestMeta,
) -> Result<LoginOutcome, AppError> {
    let email = Email::parse(&request.email)
        .map_err(|_| AppError::Unauthorized("Invalid credentials".to_owned()))?;

    let store = state.store();
    let user = find_user_by_email(store, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account not found".to_owned()))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".to_owned()));
    }

    let max_age_seconds = if request.keep_login {
        KEEP_LOGIN_SECONDS
    } else {
        DEFAULT_LOGIN_SECONDS
    };

    let now = Utc::now();
    let session = Session {
        token: SessionToken::generate(),
        email: user.email.clone(),
        // point-in-time copy; later role changes do not touch this session
        role: user.role,
        ip: meta.ip,
        browser: meta.browser,
        os: meta.os,
        created_at: now,
        expires_at: now + Duration::seconds(max_age_seconds),
    };

    let mut tx = store.begin().await?;
    store
        .insert(&mut *tx, &Record::Session(session.clone()))
        .await?;
    tx.commit().await.map_err(StoreError::Database)?;

    tracing::info!(email = %session.email, role = %session.role, "login");
    Ok(LoginOutcome {
        session,
        max_age_seconds,
    })
}

/// Delete the session row behind an authenticated request.
///
/// # Errors
///
/// Store faults only; logging out an already-deleted session succeeds.
pub async fn logout(state: &AppState, session: &Session) -> Result<(), AppError> {
    let identifier: Filters = vec![("token", Filter::equals(&session.token))];
    state
        .store()
        .delete_by_identifier(EntityKind::Session, &identifier)
        .await?;

    tracing::info!(email = %session.email, "logout");
    Ok(())
}

/// Resolve the account behind a valid session, for the status endpoint.
///
/// # Errors
///
/// `Unauthorized` if the account no longer exists, store faults otherwise.
pub async fn auth_status(state: &AppState, session: &Session) -> Result<User, AppError> {
    resolve_session_user(state.store(), &session.email).await
}

// =============================================================================
// Passwords
// =============================================================================

/// Check password strength: at least 8 characters with upper- and lowercase
/// letters, a digit, and a special character. Returns every unmet rule in
/// one message.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    let mut errors: Vec<&str> = Vec::new();

    if password.len() < 8 {
        errors.push("Need more than 8 characters.");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("At least one uppercase letter is required.");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("At least one lowercase letter is required.");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("At least one digit is required.");
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        errors.push("At least one special character is required.");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join(" "))
    }
}

/// Hash a password using Argon2id.
///
/// Public so the CLI seeder can create accounts with real hashes.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::Internal("password hashing failed".to_owned()))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_strength_valid() {
        assert!(validate_password_strength("Str0ng!pass").is_ok());
    }

    #[test]
    fn test_password_strength_collects_every_failure() {
        let message = validate_password_strength("abc").unwrap_err();
        assert!(message.contains("Need more than 8 characters."));
        assert!(message.contains("uppercase"));
        assert!(message.contains("digit"));
        assert!(message.contains("special character"));
        assert!(!message.contains("lowercase letter is required"));
    }

    #[test]
    fn test_password_strength_missing_special() {
        let message = validate_password_strength("Abcdefg1").unwrap_err();
        assert_eq!(message, "At least one special character is required.");
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("Str0ng!pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Str0ng!pass", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            AuthRejection::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::InvalidSession.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::SessionExpired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_session_lifetimes() {
        assert_eq!(KEEP_LOGIN_SECONDS, 30 * 24 * 3600);
        assert_eq!(DEFAULT_LOGIN_SECONDS, 90 * 3600);
    }
}
