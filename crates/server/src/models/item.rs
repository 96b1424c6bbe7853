//! Item entity.

use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;

use localmart_core::{ItemId, ShopId};

/// An item listed by a shop. `item_name` is unique within its shop.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub shop_id: ShopId,
    pub item_name: String,
    pub price: f64,
    pub description: Option<String>,
    pub note: Option<String>,
}

impl sqlx::FromRow<'_, PgRow> for Item {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: ItemId::new(row.try_get("id")?),
            shop_id: ShopId::new(row.try_get("shop_id")?),
            item_name: row.try_get("item_name")?,
            price: row.try_get("price")?,
            description: row.try_get("description")?,
            note: row.try_get("note")?,
        })
    }
}
