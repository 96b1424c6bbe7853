//! Database access for the marketplace `PostgreSQL` store.
//!
//! # Tables
//!
//! - `users` - Accounts (shoppers, vendors, contributors, admins)
//! - `sessions` - Login sessions keyed by opaque token
//! - `shops` - Vendor shops with coordinates
//! - `items` - Items listed per shop
//! - `inventories` - Stock rows, one per `(shop, item)` pair
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p localmart-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod store;

pub use store::{
    DeleteOutcome, EntityKind, EntityStore, FieldPatch, FieldValue, Filter, Filters, Record,
    UpdateOutcome,
};

/// Embedded migrations for the marketplace schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors from the persistence layer.
///
/// Unexpected database faults never reach clients as-is; they are logged and
/// surfaced as a generic server error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (unique key or dangling reference).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
