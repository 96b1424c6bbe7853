//! Search-index document types and collection schemas.
//!
//! Wire field names (`shopName`, `itemName`, ...) follow the index schema,
//! not Rust naming. Every document carries the backend's reserved `id` field
//! set to the entity id, so by-id updates and deletes address the right
//! document.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::models::{Item, Shop};

/// Name of the shops collection.
pub const SHOPS_COLLECTION: &str = "shops";

/// Name of the items collection.
pub const ITEMS_COLLECTION: &str = "items";

/// A shop as indexed for geo search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopDocument {
    pub id: String,
    pub shop_id: String,
    pub owner_id: String,
    #[serde(rename = "shopName")]
    pub shop_name: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `[latitude, longitude]` geopoint.
    pub location: [f64; 2],
}

impl ShopDocument {
    /// Build the index document for a shop.
    #[must_use]
    pub fn from_shop(shop: &Shop) -> Self {
        Self {
            id: shop.shop_id.to_string(),
            shop_id: shop.shop_id.to_string(),
            owner_id: shop.owner_id.to_string(),
            shop_name: shop.shop_name.clone(),
            full_name: shop.full_name.clone(),
            address: shop.address.clone(),
            description: shop.description.clone(),
            location: [shop.latitude, shop.longitude],
        }
    }
}

/// An item as indexed for text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDocument {
    pub id: String,
    pub item_id: String,
    pub shop_id: String,
    #[serde(rename = "itemName")]
    pub item_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ItemDocument {
    /// Build the index document for an item.
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            item_id: item.id.to_string(),
            shop_id: item.shop_id.to_string(),
            item_name: item.item_name.clone(),
            description: item.description.clone(),
            price: item.price,
            note: item.note.clone(),
        }
    }
}

/// Schema for the shops collection.
#[must_use]
pub fn shops_schema() -> Value {
    json!({
        "name": SHOPS_COLLECTION,
        "fields": [
            {"name": "shop_id", "type": "string"},
            {"name": "owner_id", "type": "string", "facet": true},
            {"name": "shopName", "type": "string"},
            {"name": "fullName", "type": "string"},
            {"name": "address", "type": "string"},
            {"name": "description", "type": "string", "optional": true},
            {"name": "location", "type": "geopoint"},
        ],
    })
}

/// Schema for the items collection.
#[must_use]
pub fn items_schema() -> Value {
    json!({
        "name": ITEMS_COLLECTION,
        "fields": [
            {"name": "item_id", "type": "string"},
            {"name": "shop_id", "type": "string", "facet": true},
            {"name": "itemName", "type": "string"},
            {"name": "description", "type": "string", "optional": true},
            {"name": "price", "type": "float"},
            {"name": "note", "type": "string", "optional": true},
        ],
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use localmart_core::{ItemId, ShopId, UserId};

    fn sample_shop() -> Shop {
        Shop {
            shop_id: ShopId::generate(),
            owner_id: UserId::generate(),
            full_name: "Asha Verma".to_owned(),
            shop_name: "Verma Handicrafts".to_owned(),
            address: "14 Bazaar Road".to_owned(),
            contact: None,
            description: Some("Handmade goods".to_owned()),
            is_open: true,
            latitude: 28.6139,
            longitude: 77.2090,
            created_at: Utc::now(),
            updated_at: None,
            note: None,
        }
    }

    #[test]
    fn test_shop_document_wire_names() {
        let shop = sample_shop();
        let doc = ShopDocument::from_shop(&shop);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["id"], shop.shop_id.to_string());
        assert_eq!(json["shopName"], "Verma Handicrafts");
        assert_eq!(json["fullName"], "Asha Verma");
        assert_eq!(json["location"][0], 28.6139);
        assert_eq!(json["location"][1], 77.2090);
        assert!(json.get("shop_name").is_none());
    }

    #[test]
    fn test_item_document_wire_names_and_optional_fields() {
        let item = Item {
            id: ItemId::generate(),
            shop_id: ShopId::generate(),
            item_name: "Scarf".to_owned(),
            price: 1250.0,
            description: None,
            note: None,
        };
        let doc = ItemDocument::from_item(&item);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["itemName"], "Scarf");
        assert_eq!(json["price"], 1250.0);
        assert_eq!(json["id"], json["item_id"]);
        // absent optionals are omitted, matching the optional schema fields
        assert!(json.get("description").is_none());
        assert!(json.get("note").is_none());
    }

    #[test]
    fn test_document_round_trip() {
        let shop = sample_shop();
        let doc = ShopDocument::from_shop(&shop);
        let json = serde_json::to_string(&doc).unwrap();
        let back: ShopDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
