//! Inventory entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;

use localmart_core::{InventoryId, ItemId, ShopId, StockStatus};

use super::decode_text_column;

/// Stock record for one item in one shop.
///
/// At most one row exists per `(shop_id, item_id)` pair; the pair is checked
/// before insert and backed by a unique constraint.
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    pub inventory_id: InventoryId,
    pub shop_id: ShopId,
    pub item_id: ItemId,
    pub quantity: i64,
    pub price_at_entry: Option<f64>,
    pub last_restocked_at: Option<DateTime<Utc>>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    pub status: StockStatus,
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl sqlx::FromRow<'_, PgRow> for Inventory {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let status_raw: String = row.try_get("status")?;

        Ok(Self {
            inventory_id: InventoryId::new(row.try_get("inventory_id")?),
            shop_id: ShopId::new(row.try_get("shop_id")?),
            item_id: ItemId::new(row.try_get("item_id")?),
            quantity: row.try_get("quantity")?,
            price_at_entry: row.try_get("price_at_entry")?,
            last_restocked_at: row.try_get("last_restocked_at")?,
            min_quantity: row.try_get("min_quantity")?,
            max_quantity: row.try_get("max_quantity")?,
            status: decode_text_column("status", &status_raw)?,
            location: row.try_get("location")?,
            batch_number: row.try_get("batch_number")?,
            expiry_date: row.try_get("expiry_date")?,
            updated_at: row.try_get("updated_at")?,
            note: row.try_get("note")?,
        })
    }
}
