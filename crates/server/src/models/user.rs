//! User account entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;

use localmart_core::{Email, Role, UserId};

use super::decode_text_column;

/// A registered account.
///
/// The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl sqlx::FromRow<'_, PgRow> for User {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let email_raw: String = row.try_get("email")?;
        let role_raw: String = row.try_get("role")?;

        Ok(Self {
            id: UserId::new(row.try_get("id")?),
            email: decode_text_column("email", &email_raw)?,
            password_hash: row.try_get("password")?,
            role: decode_text_column("role", &role_raw)?,
            full_name: row.try_get("full_name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            note: row.try_get("note")?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: UserId::generate(),
            email: Email::parse("vendor@example.com").unwrap(),
            password_hash: "$argon2id$v=19$secret".to_owned(),
            role: Role::Vendor,
            full_name: Some("Asha Verma".to_owned()),
            created_at: Utc::now(),
            updated_at: None,
            note: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "vendor@example.com");
        assert_eq!(json["role"], "VENDOR");
    }
}
