//! Inventory mutations and reads.
//!
//! Inventory rows are not cached and not indexed for search; the pipeline
//! here is authorize -> validate -> pre-check -> write -> commit.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use localmart_core::{InventoryId, ItemId, ShopId, StockStatus};

use crate::db::{
    DeleteOutcome, EntityKind, FieldPatch, FieldValue, Filter, Filters, Record, StoreError,
    UpdateOutcome,
};
use crate::error::AppError;
use crate::models::{Inventory, Session};
use crate::state::AppState;

use super::{Mutation, ensure_owner, load_shop, resolve_session_user};

#[derive(Debug, Deserialize)]
pub struct InventoryCreate {
    pub shop_id: ShopId,
    pub item_id: ItemId,
    pub quantity: i64,
    pub price_at_entry: Option<f64>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    pub status: Option<StockStatus>,
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InventoryUpdate {
    pub inventory_id: Option<InventoryId>,
    pub shop_id: Option<ShopId>,
    pub item_id: Option<ItemId>,
    pub quantity: Option<i64>,
    pub price_at_entry: Option<f64>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    pub status: Option<StockStatus>,
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

fn into_inventory(record: Record) -> Result<Inventory, AppError> {
    match record {
        Record::Inventory(inventory) => Ok(inventory),
        other => Err(AppError::Internal(format!(
            "expected inventory record, got {:?}",
            other.kind()
        ))),
    }
}

fn validate_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity < 0 {
        return Err(AppError::Validation(
            "Quantity must be zero or positive.".to_owned(),
        ));
    }
    Ok(())
}

fn validate_min_max(min_quantity: Option<i64>, max_quantity: Option<i64>) -> Result<(), AppError> {
    if let (Some(min), Some(max)) = (min_quantity, max_quantity)
        && min > max
    {
        return Err(AppError::Validation(
            "min_quantity must be less than or equal to max_quantity.".to_owned(),
        ));
    }
    Ok(())
}

/// Record stock for an item in a shop.
///
/// # Errors
///
/// Missing shop or item, authorization failures, range validation failures,
/// duplicate `(shop, item)` row (conflict), or a store fault.
pub async fn add_inventory(
    state: &AppState,
    session: &Session,
    request: InventoryCreate,
) -> Result<Inventory, AppError> {
    let store = state.store();

    // authorize against the owning shop
    let shop = load_shop(store, request.shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found.".to_owned()))?;
    let user = resolve_session_user(store, &session.email).await?;
    ensure_owner(&user, &shop, "You can only add inventory to your own shop.")?;

    // referenced item must exist
    let item = store
        .get_one(
            EntityKind::Item,
            &vec![("id", Filter::equals(request.item_id))],
        )
        .await?;
    if item.is_none() {
        return Err(AppError::NotFound("Item not found.".to_owned()));
    }

    // range validations
    validate_quantity(request.quantity)?;
    validate_min_max(request.min_quantity, request.max_quantity)?;
    let now = Utc::now();
    if let Some(expiry) = request.expiry_date
        && expiry <= now
    {
        return Err(AppError::Validation(
            "Expiry date, if provided, must be in the future.".to_owned(),
        ));
    }

    // one row per (shop, item)
    let existing = store
        .get_one(
            EntityKind::Inventory,
            &vec![
                ("shop_id", Filter::equals(request.shop_id)),
                ("item_id", Filter::equals(request.item_id)),
            ],
        )
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "Inventory already exists for this item and shop".to_owned(),
        ));
    }

    let inventory = Inventory {
        inventory_id: InventoryId::generate(),
        shop_id: request.shop_id,
        item_id: request.item_id,
        quantity: request.quantity,
        price_at_entry: request.price_at_entry,
        last_restocked_at: Some(now),
        min_quantity: request.min_quantity,
        max_quantity: request.max_quantity,
        status: request.status.unwrap_or_default(),
        location: request.location,
        batch_number: request.batch_number,
        expiry_date: request.expiry_date,
        updated_at: None,
        note: request.note,
    };

    // write + commit: the durability boundary
    let mut tx = store.begin().await?;
    store
        .insert(&mut *tx, &Record::Inventory(inventory.clone()))
        .await?;
    tx.commit().await.map_err(StoreError::Database)?;

    Ok(inventory)
}

fn update_identifier(request: &InventoryUpdate) -> Result<Filters, AppError> {
    if let Some(inventory_id) = request.inventory_id {
        return Ok(vec![("inventory_id", Filter::equals(inventory_id))]);
    }
    if let (Some(shop_id), Some(item_id)) = (request.shop_id, request.item_id) {
        return Ok(vec![
            ("shop_id", Filter::equals(shop_id)),
            ("item_id", Filter::equals(item_id)),
        ]);
    }
    Err(AppError::Validation(
        "Inventory id or (shop_id & item_id) required".to_owned(),
    ))
}

/// Apply a partial update to an inventory row, identified by its surrogate id
/// or by the `(shop, item)` pair.
///
/// # Errors
///
/// Missing row, authorization failures, range validation failures, or a
/// store fault.
pub async fn update_inventory(
    state: &AppState,
    session: &Session,
    request: InventoryUpdate,
) -> Result<Mutation<Inventory>, AppError> {
    let store = state.store();
    let identifier = update_identifier(&request)?;

    let record = store.get_one(EntityKind::Inventory, &identifier).await?;
    let Some(Record::Inventory(current)) = record else {
        return Err(AppError::NotFound("Inventory record not found".to_owned()));
    };

    // authorize against the owning shop
    let shop = load_shop(store, current.shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found.".to_owned()))?;
    let user = resolve_session_user(store, &session.email).await?;
    ensure_owner(&user, &shop, "You can only update inventory for your own shop.")?;

    // range validations; absent sides of min/max fall back to stored values
    if let Some(quantity) = request.quantity {
        validate_quantity(quantity)?;
    }
    validate_min_max(
        request.min_quantity.or(current.min_quantity),
        request.max_quantity.or(current.max_quantity),
    )?;
    if let Some(expiry) = request.expiry_date
        && expiry <= Utc::now()
    {
        return Err(AppError::Validation(
            "Expiry date must be in the future.".to_owned(),
        ));
    }

    let mut patch: FieldPatch = Vec::new();
    if let Some(quantity) = request.quantity {
        patch.push(("quantity", FieldValue::Int(quantity)));
        // an identical quantity is not a restock
        if quantity != current.quantity {
            patch.push(("last_restocked_at", FieldValue::Timestamp(Utc::now())));
        }
    }
    if let Some(price_at_entry) = request.price_at_entry {
        patch.push(("price_at_entry", FieldValue::Float(price_at_entry)));
    }
    if let Some(min_quantity) = request.min_quantity {
        patch.push(("min_quantity", FieldValue::Int(min_quantity)));
    }
    if let Some(max_quantity) = request.max_quantity {
        patch.push(("max_quantity", FieldValue::Int(max_quantity)));
    }
    if let Some(status) = request.status {
        patch.push(("status", status.into()));
    }
    if let Some(location) = request.location.clone() {
        patch.push(("location", FieldValue::Text(location)));
    }
    if let Some(batch_number) = request.batch_number.clone() {
        patch.push(("batch_number", FieldValue::Text(batch_number)));
    }
    if let Some(expiry_date) = request.expiry_date {
        patch.push(("expiry_date", FieldValue::Timestamp(expiry_date)));
    }
    if let Some(note) = request.note.clone() {
        patch.push(("note", FieldValue::Text(note)));
    }

    if patch.is_empty() {
        return Err(AppError::Validation("No data to update".to_owned()));
    }

    match store
        .update_by_identifier(EntityKind::Inventory, &identifier, &patch)
        .await?
    {
        UpdateOutcome::NotFound => Err(AppError::NotFound("Inventory record not found".to_owned())),
        UpdateOutcome::NoChanges(record) => Ok(Mutation::NoChanges(into_inventory(record)?)),
        UpdateOutcome::Updated(record) => Ok(Mutation::Applied(into_inventory(record)?)),
    }
}

/// Fetch one inventory row by surrogate id.
///
/// # Errors
///
/// `NotFound` if the row does not exist, store faults otherwise.
pub async fn get_inventory(
    state: &AppState,
    inventory_id: InventoryId,
) -> Result<Inventory, AppError> {
    let record = state
        .store()
        .get_one(
            EntityKind::Inventory,
            &vec![("inventory_id", Filter::equals(inventory_id))],
        )
        .await?;
    match record {
        Some(Record::Inventory(inventory)) => Ok(inventory),
        _ => Err(AppError::NotFound("Not found".to_owned())),
    }
}

/// List every inventory row of a shop. Empty list, not an error, for a shop
/// with no stock.
///
/// # Errors
///
/// Store faults only.
pub async fn inventory_for_shop(
    state: &AppState,
    shop_id: ShopId,
) -> Result<Vec<Inventory>, AppError> {
    let records = state
        .store()
        .get_all(
            EntityKind::Inventory,
            &vec![("shop_id", Filter::equals(shop_id))],
        )
        .await?;
    records.into_iter().map(into_inventory).collect()
}

/// Delete an inventory row.
///
/// # Errors
///
/// Missing row, authorization failures, or a store fault.
pub async fn delete_inventory(
    state: &AppState,
    session: &Session,
    inventory_id: InventoryId,
) -> Result<Inventory, AppError> {
    let store = state.store();

    let identifier: Filters = vec![("inventory_id", Filter::equals(inventory_id))];
    let record = store.get_one(EntityKind::Inventory, &identifier).await?;
    let Some(Record::Inventory(current)) = record else {
        return Err(AppError::NotFound("Not found".to_owned()));
    };

    // authorize against the owning shop
    let shop = load_shop(store, current.shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found.".to_owned()))?;
    let user = resolve_session_user(store, &session.email).await?;
    ensure_owner(&user, &shop, "You can only delete inventory from your own shop.")?;

    match store
        .delete_by_identifier(EntityKind::Inventory, &identifier)
        .await?
    {
        DeleteOutcome::NotFound => Err(AppError::NotFound("Not found".to_owned())),
        DeleteOutcome::Deleted(record) => into_inventory(record),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_min_max_rejects_inverted_bounds() {
        // Scenario: quantity 100, min 10, max 5 -> rejected
        let err = validate_min_max(Some(10), Some(5)).unwrap_err();
        assert!(matches!(err, AppError::Validation(message)
            if message == "min_quantity must be less than or equal to max_quantity."));
    }

    #[test]
    fn test_validate_min_max_partial_bounds_pass() {
        assert!(validate_min_max(Some(10), None).is_ok());
        assert!(validate_min_max(None, Some(5)).is_ok());
        assert!(validate_min_max(None, None).is_ok());
        assert!(validate_min_max(Some(5), Some(5)).is_ok());
    }

    #[test]
    fn test_update_identifier_prefers_surrogate_id() {
        let request = InventoryUpdate {
            inventory_id: Some(InventoryId::generate()),
            shop_id: Some(ShopId::generate()),
            item_id: Some(ItemId::generate()),
            quantity: None,
            price_at_entry: None,
            min_quantity: None,
            max_quantity: None,
            status: None,
            location: None,
            batch_number: None,
            expiry_date: None,
            note: None,
        };
        let identifier = update_identifier(&request).expect("identifier");
        assert_eq!(identifier.len(), 1);
        assert_eq!(identifier[0].0, "inventory_id");
    }

    #[test]
    fn test_update_identifier_requires_something() {
        let request = InventoryUpdate {
            inventory_id: None,
            shop_id: Some(ShopId::generate()),
            item_id: None,
            quantity: None,
            price_at_entry: None,
            min_quantity: None,
            max_quantity: None,
            status: None,
            location: None,
            batch_number: None,
            expiry_date: None,
            note: None,
        };
        assert!(update_identifier(&request).is_err());
    }
}
