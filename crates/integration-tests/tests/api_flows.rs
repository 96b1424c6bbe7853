//! End-to-end API flow tests.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - A running Typesense-compatible search backend
//! - The server running (cargo run -p localmart-server)
//!
//! Run with: cargo test -p localmart-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
fn base_url() -> String {
    std::env::var("LOCALMART_BASE_URL").unwrap_or_else(|_| "http://localhost:8059".to_string())
}

/// Session cookie name (must match the server's COOKIE_KEY).
fn cookie_key() -> String {
    std::env::var("COOKIE_KEY").unwrap_or_else(|_| "lm_session".to_string())
}

/// Create an HTTP client that keeps session cookies.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a vendor with a unique email and log in; the returned client
/// carries the session cookie.
async fn vendor_client() -> (Client, String) {
    let client = client();
    let base = base_url();
    let email = format!("vendor-{}@example.com", Uuid::new_v4());

    let resp = client
        .post(format!("{base}/users/signup/vendor"))
        .json(&json!({
            "fullName": "Test Vendor",
            "email": email,
            "password": "Str0ng!pass",
            "shopName": "Integration Test Shop",
            "address": "1 Test Street, Testville",
        }))
        .send()
        .await
        .expect("signup request");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base}/users/login"))
        .json(&json!({"email": email, "password": "Str0ng!pass"}))
        .send()
        .await
        .expect("login request");
    assert_eq!(resp.status(), StatusCode::OK);

    (client, email)
}

/// Create a shop owned by the logged-in vendor, returning its id.
async fn create_shop(client: &Client, owner_id: &str) -> String {
    let base = base_url();
    let shop_name = format!("Verma Handicrafts {}", Uuid::new_v4());

    let resp = client
        .post(format!("{base}/shops/create_shop"))
        .json(&json!({
            "owner_id": owner_id,
            "fullName": "Test Vendor",
            "shopName": shop_name,
            "address": "14 Bazaar Road, Jaipur",
            "latitude": 26.9124,
            "longitude": 75.7873,
        }))
        .send()
        .await
        .expect("create shop request");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("create shop body");
    body["body"]["shop_id"].as_str().expect("shop_id").to_owned()
}

/// Resolve the logged-in account's id via the status endpoint.
async fn current_user_id(client: &Client) -> String {
    let resp = client
        .get(format!("{}/users/auth", base_url()))
        .send()
        .await
        .expect("auth status request");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("auth status body");
    body["body"]["id"].as_str().expect("user id").to_owned()
}

// ============================================================================
// Scenario A: shop creation round trip
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server, database, and search backend"]
async fn test_create_shop_and_read_it_back() {
    let (client, _email) = vendor_client().await;
    let owner_id = current_user_id(&client).await;
    let shop_id = create_shop(&client, &owner_id).await;

    let resp = client
        .get(format!("{}/shops/{shop_id}", base_url()))
        .send()
        .await
        .expect("get shop request");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("get shop body");
    assert_eq!(body["body"]["owner_id"].as_str().unwrap(), owner_id);
}

// ============================================================================
// Scenario B: duplicate item conflict
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server, database, and search backend"]
async fn test_duplicate_item_in_shop_conflicts() {
    let (client, _email) = vendor_client().await;
    let owner_id = current_user_id(&client).await;
    let shop_id = create_shop(&client, &owner_id).await;
    let base = base_url();

    let item = json!({
        "itemName": "Scarf",
        "shop_id": shop_id,
        "price": 1250.0,
    });

    let resp = client
        .post(format!("{base}/items/add_item"))
        .json(&item)
        .send()
        .await
        .expect("first add");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base}/items/add_item"))
        .json(&item)
        .send()
        .await
        .expect("second add");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ============================================================================
// Scenario C: inventory range validation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server, database, and search backend"]
async fn test_inventory_min_above_max_rejected() {
    let (client, _email) = vendor_client().await;
    let owner_id = current_user_id(&client).await;
    let shop_id = create_shop(&client, &owner_id).await;
    let base = base_url();

    let resp = client
        .post(format!("{base}/items/add_item"))
        .json(&json!({"itemName": "Scarf", "shop_id": shop_id, "price": 1250.0}))
        .send()
        .await
        .expect("add item");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let item_id = {
        let body: Value = resp.json().await.expect("item body");
        body["body"]["id"].as_str().expect("item id").to_owned()
    };

    let resp = client
        .post(format!("{base}/inventory/add"))
        .json(&json!({
            "shop_id": shop_id,
            "item_id": item_id,
            "quantity": 100,
            "min_quantity": 10,
            "max_quantity": 5,
        }))
        .send()
        .await
        .expect("add inventory");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("error body");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("min_quantity must be less than or equal to max_quantity")
    );
}

// ============================================================================
// Scenario D: lazy session expiry
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and direct database access (DATABASE_URL)"]
async fn test_expired_session_is_deleted_on_first_use() {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("connect");

    // plant a session that expired an hour ago
    let token = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sessions (token, email, role, created_at, expires_at)
         VALUES ($1, $2, 'USER', now() - interval '2 hours', now() - interval '1 hour')",
    )
    .bind(&token)
    .bind(format!("expired-{token}@example.com"))
    .execute(&pool)
    .await
    .expect("insert expired session");

    let resp = client()
        .get(format!("{}/users/auth", base_url()))
        .header("Cookie", format!("{}={token}", cookie_key()))
        .send()
        .await
        .expect("auth status request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("error body");
    assert!(body["message"].as_str().unwrap().contains("Session expired"));

    // the row is gone after the first rejected access
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE token = $1")
        .bind(&token)
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(remaining, 0);
}

// ============================================================================
// Scenario E: idempotent update
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server, database, and search backend"]
async fn test_same_value_update_reports_no_changes() {
    let (client, _email) = vendor_client().await;
    let owner_id = current_user_id(&client).await;
    let shop_id = create_shop(&client, &owner_id).await;
    let base = base_url();

    let resp = client
        .post(format!("{base}/items/add_item"))
        .json(&json!({"itemName": "Scarf", "shop_id": shop_id, "price": 19.99}))
        .send()
        .await
        .expect("add item");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .patch(format!("{base}/items/update_item"))
        .json(&json!({"itemName": "Scarf", "shop_id": shop_id, "price": 19.99}))
        .send()
        .await
        .expect("no-op update");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("update body");
    assert!(body["message"].as_str().unwrap().contains("No changes"));
}

// ============================================================================
// Cache/store consistency after a shop update
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server, database, and search backend"]
async fn test_shop_update_visible_on_next_read() {
    let (client, _email) = vendor_client().await;
    let owner_id = current_user_id(&client).await;
    let shop_id = create_shop(&client, &owner_id).await;
    let base = base_url();

    // warm the cache
    let resp = client
        .get(format!("{base}/shops/{shop_id}"))
        .send()
        .await
        .expect("warm read");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .patch(format!("{base}/shops/update_shop"))
        .json(&json!({"shop_id": shop_id, "address": "22 New Market Lane, Jaipur"}))
        .send()
        .await
        .expect("update shop");
    assert_eq!(resp.status(), StatusCode::OK);

    // the committed update must be visible: either the cache was invalidated
    // (fresh store read) or the entry was refreshed
    let resp = client
        .get(format!("{base}/shops/{shop_id}"))
        .send()
        .await
        .expect("post-update read");
    let body: Value = resp.json().await.expect("shop body");
    assert_eq!(
        body["body"]["address"].as_str().unwrap(),
        "22 New Market Lane, Jaipur"
    );
}

// ============================================================================
// Role gating
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server, database, and search backend"]
async fn test_shopper_cannot_create_shop() {
    let http = client();
    let base = base_url();
    let email = format!("shopper-{}@example.com", Uuid::new_v4());

    let resp = http
        .post(format!("{base}/users/signup/user"))
        .json(&json!({
            "fullName": "Test Shopper",
            "email": email,
            "password": "Str0ng!pass",
        }))
        .send()
        .await
        .expect("signup");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = http
        .post(format!("{base}/users/login"))
        .json(&json!({"email": email, "password": "Str0ng!pass"}))
        .send()
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = http
        .post(format!("{base}/shops/create_shop"))
        .json(&json!({
            "owner_id": Uuid::new_v4().to_string(),
            "fullName": "Test Shopper",
            "shopName": format!("Forbidden Shop {}", Uuid::new_v4()),
            "address": "1 Test Street, Testville",
            "latitude": 0.0,
            "longitude": 0.0,
        }))
        .send()
        .await
        .expect("create shop");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_missing_token_rejected() {
    let resp = client()
        .get(format!("{}/users/auth", base_url()))
        .send()
        .await
        .expect("auth status request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("error body");
    assert_eq!(
        body["message"].as_str().unwrap(),
        "Authentication token not provided."
    );
}
