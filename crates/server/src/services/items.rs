//! Item mutations and cached item reads.

use serde::Deserialize;
use serde_json::{Value, json};

use localmart_core::{ItemId, ShopId};

use crate::cache::keys;
use crate::db::{
    DeleteOutcome, EntityKind, FieldPatch, FieldValue, Filter, Filters, Record, StoreError,
    UpdateOutcome,
};
use crate::error::AppError;
use crate::models::{Item, Session};
use crate::search::{ItemDocument, propagate};
use crate::state::AppState;

use super::{CachedRead, Mutation, ensure_owner, load_shop, resolve_session_user};

#[derive(Debug, Deserialize)]
pub struct ItemCreate {
    #[serde(rename = "itemName")]
    pub item_name: String,
    pub shop_id: ShopId,
    pub price: f64,
    pub description: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemUpdate {
    #[serde(rename = "itemName")]
    pub item_name: String,
    pub shop_id: ShopId,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub note: Option<String>,
}

fn into_item(record: Record) -> Result<Item, AppError> {
    match record {
        Record::Item(item) => Ok(item),
        other => Err(AppError::Internal(format!(
            "expected item record, got {:?}",
            other.kind()
        ))),
    }
}

async fn find_item(
    state: &AppState,
    shop_id: ShopId,
    item_name: &str,
) -> Result<Option<Item>, AppError> {
    let record = state
        .store()
        .get_one(
            EntityKind::Item,
            &vec![
                ("item_name", Filter::equals(item_name)),
                ("shop_id", Filter::equals(shop_id)),
            ],
        )
        .await?;
    match record {
        Some(Record::Item(item)) => Ok(Some(item)),
        _ => Ok(None),
    }
}

/// Add an item to a shop.
///
/// # Errors
///
/// Validation failures, missing shop, authorization failures, duplicate
/// `(itemName, shop)` (conflict), or a store fault.
pub async fn add_item(
    state: &AppState,
    session: &Session,
    request: ItemCreate,
) -> Result<Item, AppError> {
    let store = state.store();

    // validate
    let item_name = request.item_name.trim().to_owned();
    if item_name.is_empty() {
        return Err(AppError::Validation("Invalid item name".to_owned()));
    }
    if request.price <= 0.0 {
        return Err(AppError::Validation(
            "Price must be greater than 0".to_owned(),
        ));
    }

    // authorize against the owning shop
    let shop = load_shop(store, request.shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found.".to_owned()))?;
    let user = resolve_session_user(store, &session.email).await?;
    ensure_owner(&user, &shop, "You can only add items to your own shop.")?;

    // uniqueness pre-check
    if find_item(state, request.shop_id, &item_name).await?.is_some() {
        return Err(AppError::Conflict(
            "Item already exists in this shop".to_owned(),
        ));
    }

    let item = Item {
        id: ItemId::generate(),
        shop_id: request.shop_id,
        item_name,
        price: request.price,
        description: request.description,
        note: request.note,
    };

    // write + commit: the durability boundary
    let mut tx = store.begin().await?;
    store.insert(&mut *tx, &Record::Item(item.clone())).await?;
    tx.commit().await.map_err(StoreError::Database)?;

    // pagination offsets shifted; drop every cached listing page
    state.cache().invalidate_prefix(keys::ALL_ITEMS_PREFIX);

    // best-effort index propagation
    let document = ItemDocument::from_item(&item);
    let search = state.search().clone();
    propagate("item.create", async move { search.upsert_item(&document).await }).await;

    Ok(item)
}

/// Fetch one item by name, read-through cached under `item:<itemName>`.
///
/// # Errors
///
/// `NotFound` if no item carries the name, store faults otherwise.
pub async fn get_item(state: &AppState, item_name: &str) -> Result<CachedRead, AppError> {
    let key = keys::item(item_name);
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(CachedRead {
            body: (*cached).clone(),
            from_cache: true,
        });
    }

    let record = state
        .store()
        .get_one(
            EntityKind::Item,
            &vec![("item_name", Filter::equals(item_name))],
        )
        .await?;
    let Some(Record::Item(item)) = record else {
        return Err(AppError::NotFound("Item not found".to_owned()));
    };

    let body = serde_json::to_value(&item).map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache().put(key, body.clone()).await;

    Ok(CachedRead {
        body,
        from_cache: false,
    })
}

/// Fetch one listing page, read-through cached under
/// `all_items:page_<p>:size_<s>`. The body carries the page data plus a
/// pagination block with the unfiltered total at call time.
///
/// # Errors
///
/// Validation failure on a non-positive page, store faults otherwise.
pub async fn list_items(state: &AppState, page: i64, page_size: i64) -> Result<CachedRead, AppError> {
    if page < 1 || page_size < 1 {
        return Err(AppError::Validation(
            "page and page_size must be positive".to_owned(),
        ));
    }

    let key = keys::items_page(page, page_size);
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(CachedRead {
            body: (*cached).clone(),
            from_cache: true,
        });
    }

    let offset = (page - 1) * page_size;
    let (records, total) = state
        .store()
        .get_page(EntityKind::Item, offset, page_size)
        .await?;

    let items = records
        .into_iter()
        .map(into_item)
        .collect::<Result<Vec<_>, _>>()?;

    let body = json!({
        "data": items,
        "pagination": {
            "page": page,
            "page_size": page_size,
            "total": total,
            "pages": (total + page_size - 1) / page_size,
        }
    });
    state.cache().put(key, body.clone()).await;

    Ok(CachedRead {
        body,
        from_cache: false,
    })
}

/// Apply a partial update to an item, identified by `(itemName, shop)`.
///
/// # Errors
///
/// Missing item, authorization failures, validation failures, or a store
/// fault.
pub async fn update_item(
    state: &AppState,
    session: &Session,
    request: ItemUpdate,
) -> Result<Mutation<Item>, AppError> {
    let store = state.store();

    let item = find_item(state, request.shop_id, &request.item_name)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found in the specified shop.".to_owned()))?;

    // authorize against the owning shop
    let shop = load_shop(store, item.shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found.".to_owned()))?;
    let user = resolve_session_user(store, &session.email).await?;
    ensure_owner(&user, &shop, "You can only update items in your own shop.")?;

    // validate and assemble the store patch plus the indexed-field subset
    let mut patch: FieldPatch = Vec::new();
    let mut index_patch = serde_json::Map::new();

    if let Some(price) = request.price {
        if price <= 0.0 {
            return Err(AppError::Validation(
                "Price must be greater than 0".to_owned(),
            ));
        }
        index_patch.insert("price".to_owned(), json!(price));
        patch.push(("price", FieldValue::Float(price)));
    }
    if let Some(description) = request.description.clone() {
        index_patch.insert("description".to_owned(), json!(description.clone()));
        patch.push(("description", FieldValue::Text(description)));
    }
    if let Some(note) = request.note.clone() {
        index_patch.insert("note".to_owned(), json!(note.clone()));
        patch.push(("note", FieldValue::Text(note)));
    }

    if patch.is_empty() {
        return Err(AppError::Validation("No data to update".to_owned()));
    }

    let identifier: Filters = vec![
        ("item_name", Filter::equals(request.item_name.as_str())),
        ("shop_id", Filter::equals(request.shop_id)),
    ];
    match store
        .update_by_identifier(EntityKind::Item, &identifier, &patch)
        .await?
    {
        UpdateOutcome::NotFound => Err(AppError::NotFound(
            "Item not found in the specified shop.".to_owned(),
        )),
        UpdateOutcome::NoChanges(record) => Ok(Mutation::NoChanges(into_item(record)?)),
        UpdateOutcome::Updated(record) => {
            let updated = into_item(record)?;

            state.cache().invalidate(&keys::item(&updated.item_name)).await;
            state.cache().invalidate_prefix(keys::ALL_ITEMS_PREFIX);

            if !index_patch.is_empty() {
                let search = state.search().clone();
                let id = updated.id.to_string();
                let document_patch = Value::Object(index_patch);
                propagate("item.update", async move {
                    search.update_item(&id, &document_patch).await
                })
                .await;
            }

            Ok(Mutation::Applied(updated))
        }
    }
}

/// Delete an item, identified by `(itemName, shop)`.
///
/// # Errors
///
/// Missing item, authorization failures, a conflict if inventory rows still
/// reference the item, or a store fault.
pub async fn delete_item(
    state: &AppState,
    session: &Session,
    shop_id: ShopId,
    item_name: &str,
) -> Result<Item, AppError> {
    let store = state.store();

    let item = find_item(state, shop_id, item_name)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_owned()))?;

    // authorize against the owning shop
    let shop = load_shop(store, item.shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found.".to_owned()))?;
    let user = resolve_session_user(store, &session.email).await?;
    ensure_owner(&user, &shop, "You can only delete items from your own shop.")?;

    let identifier: Filters = vec![
        ("item_name", Filter::equals(item_name)),
        ("shop_id", Filter::equals(shop_id)),
    ];
    match store
        .delete_by_identifier(EntityKind::Item, &identifier)
        .await?
    {
        DeleteOutcome::NotFound => Err(AppError::NotFound("Item not found".to_owned())),
        DeleteOutcome::Deleted(record) => {
            let deleted = into_item(record)?;

            state.cache().invalidate(&keys::item(&deleted.item_name)).await;
            state.cache().invalidate_prefix(keys::ALL_ITEMS_PREFIX);

            let search = state.search().clone();
            let id = deleted.id.to_string();
            propagate("item.delete", async move { search.delete_item(&id).await }).await;

            Ok(deleted)
        }
    }
}
