//! Session entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;

use localmart_core::{Email, Role, SessionToken};

use super::decode_text_column;

/// A login session.
///
/// The `role` is a point-in-time copy taken at login; it does not track later
/// role changes on the user. Expired rows persist until the next access
/// attempt deletes them (lazy expiry, no background sweeper).
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: SessionToken,
    pub email: Email,
    pub role: Role,
    pub ip: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has passed its absolute expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl sqlx::FromRow<'_, PgRow> for Session {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let token: String = row.try_get("token")?;
        let email_raw: String = row.try_get("email")?;
        let role_raw: String = row.try_get("role")?;

        Ok(Self {
            token: SessionToken::from_value(token),
            email: decode_text_column("email", &email_raw)?,
            role: decode_text_column("role", &role_raw)?,
            ip: row.try_get("ip")?,
            browser: row.try_get("browser")?,
            os: row.try_get("os")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: DateTime<Utc>) -> Session {
        Session {
            token: SessionToken::generate(),
            email: Email::parse("user@example.com").unwrap(),
            role: Role::User,
            ip: None,
            browser: None,
            os: None,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_not_expired_before_deadline() {
        let now = Utc::now();
        assert!(!session(now + Duration::hours(1)).is_expired(now));
    }

    #[test]
    fn test_expired_after_deadline() {
        let now = Utc::now();
        assert!(session(now - Duration::seconds(1)).is_expired(now));
    }

    #[test]
    fn test_exact_deadline_is_still_valid() {
        let now = Utc::now();
        assert!(!session(now).is_expired(now));
    }
}
