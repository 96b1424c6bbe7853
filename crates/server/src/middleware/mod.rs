//! HTTP middleware stack for the marketplace service.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS
//! 4. Rate limiting (governor, auth routes only)
//! 5. Role gate (session authentication, per route group)

pub mod auth;
pub mod rate_limit;
pub mod request_meta;

pub use auth::{ADMIN_ONLY, ANY_ROLE, CurrentSession, VENDOR_ROLES, require_roles};
pub use rate_limit::auth_rate_limiter;
pub use request_meta::RequestMeta;
