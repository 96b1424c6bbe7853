//! Shop entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;

use localmart_core::{GeoPoint, ShopId, UserId};

/// A vendor's shop.
///
/// The owner is fixed at creation time; ownership checks compare the
/// authenticated user's id against `owner_id`.
#[derive(Debug, Clone, Serialize)]
pub struct Shop {
    pub shop_id: ShopId,
    pub owner_id: UserId,
    pub full_name: String,
    pub shop_name: String,
    pub address: String,
    pub contact: Option<String>,
    pub description: Option<String>,
    pub is_open: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl Shop {
    /// The shop's location as a validated coordinate pair.
    ///
    /// Coordinates were validated on the way in, so stored values are
    /// always in range.
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.latitude, self.longitude).ok()
    }
}

impl sqlx::FromRow<'_, PgRow> for Shop {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            shop_id: ShopId::new(row.try_get("shop_id")?),
            owner_id: UserId::new(row.try_get("owner_id")?),
            full_name: row.try_get("full_name")?,
            shop_name: row.try_get("shop_name")?,
            address: row.try_get("address")?,
            contact: row.try_get("contact")?,
            description: row.try_get("description")?,
            is_open: row.try_get("is_open")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            note: row.try_get("note")?,
        })
    }
}
