//! Integration tests for Localmart.
//!
//! # Running Tests
//!
//! The tests in `tests/` exercise a running stack and are `#[ignore]`d by
//! default. To run them:
//!
//! ```bash
//! # Start PostgreSQL and Typesense, then:
//! cargo run -p localmart-cli -- migrate
//! cargo run -p localmart-server &
//!
//! cargo test -p localmart-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `LOCALMART_BASE_URL` - server under test (default: `http://localhost:8059`)
//! - `DATABASE_URL` - used by tests that plant rows directly (session expiry)
//! - `COOKIE_KEY` - session cookie name (default: `lm_session`)
