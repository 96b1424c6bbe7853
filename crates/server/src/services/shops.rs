//! Shop mutations and cached shop reads.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use localmart_core::{GeoPoint, ShopId, UserId};

use crate::cache::keys;
use crate::db::{
    DeleteOutcome, EntityKind, FieldPatch, FieldValue, Filter, Filters, Record, StoreError,
    UpdateOutcome,
};
use crate::error::AppError;
use crate::models::{Session, Shop};
use crate::search::{ShopDocument, propagate};
use crate::state::AppState;

use super::{
    CachedRead, Mutation, ensure_owner, load_shop, resolve_session_user, validate_address,
    validate_contact, validate_full_name, validate_shop_name,
};

#[derive(Debug, Deserialize)]
pub struct ShopCreate {
    pub owner_id: UserId,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "shopName")]
    pub shop_name: String,
    pub address: String,
    pub contact: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_open: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub note: Option<String>,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ShopUpdate {
    pub shop_id: ShopId,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    #[serde(rename = "shopName")]
    pub shop_name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
    pub is_open: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub note: Option<String>,
}

fn into_shop(record: Record) -> Result<Shop, AppError> {
    match record {
        Record::Shop(shop) => Ok(shop),
        other => Err(AppError::Internal(format!(
            "expected shop record, got {:?}",
            other.kind()
        ))),
    }
}

/// Create a shop for an owner.
///
/// The authenticated user must be the declared owner, unless they are an
/// admin creating a shop on a vendor's behalf.
///
/// # Errors
///
/// Validation failures, missing owner account, duplicate shop name
/// (conflict), authorization failures, or a store fault.
pub async fn create_shop(
    state: &AppState,
    session: &Session,
    request: ShopCreate,
) -> Result<Shop, AppError> {
    let store = state.store();

    // authorize
    let user = resolve_session_user(store, &session.email).await?;
    if !user.role.is_admin() && user.id != request.owner_id {
        return Err(AppError::Forbidden(
            "You are not authorized to create this shop".to_owned(),
        ));
    }

    // validate
    let full_name = validate_full_name(&request.full_name)?;
    let shop_name = validate_shop_name(&request.shop_name)?;
    let address = validate_address(&request.address)?;
    let contact = request
        .contact
        .as_deref()
        .map(validate_contact)
        .transpose()?;
    let location = GeoPoint::new(request.latitude, request.longitude)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // existence / uniqueness pre-checks
    let owner = store
        .get_one(
            EntityKind::User,
            &vec![("id", Filter::equals(request.owner_id))],
        )
        .await?;
    if owner.is_none() {
        return Err(AppError::Validation(
            "Owner ID not found. Please create an account first.".to_owned(),
        ));
    }
    let duplicate = store
        .get_one(
            EntityKind::Shop,
            &vec![("shop_name", Filter::equals(shop_name.as_str()))],
        )
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict("Shop already exists".to_owned()));
    }

    let shop = Shop {
        shop_id: ShopId::generate(),
        owner_id: request.owner_id,
        full_name,
        shop_name,
        address,
        contact,
        description: request.description,
        is_open: request.is_open,
        latitude: location.latitude,
        longitude: location.longitude,
        created_at: Utc::now(),
        updated_at: None,
        note: request.note,
    };

    // write + commit: the durability boundary
    let mut tx = store.begin().await?;
    store.insert(&mut *tx, &Record::Shop(shop.clone())).await?;
    tx.commit().await.map_err(StoreError::Database)?;

    // the owner's shop listing is now stale
    state
        .cache()
        .invalidate(&keys::shops_by_owner(shop.owner_id))
        .await;

    // best-effort index propagation
    let document = ShopDocument::from_shop(&shop);
    let search = state.search().clone();
    propagate("shop.create", async move { search.upsert_shop(&document).await }).await;

    Ok(shop)
}

/// Apply a partial update to a shop.
///
/// # Errors
///
/// Missing shop, authorization failures, validation failures, duplicate new
/// name (conflict), or a store fault.
pub async fn update_shop(
    state: &AppState,
    session: &Session,
    request: ShopUpdate,
) -> Result<Mutation<Shop>, AppError> {
    let store = state.store();

    let shop = load_shop(store, request.shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_owned()))?;

    let user = resolve_session_user(store, &session.email).await?;
    ensure_owner(&user, &shop, "You can only update your own shop.")?;

    // validate and assemble the store patch plus the indexed-field subset
    let mut patch: FieldPatch = Vec::new();
    let mut index_patch = serde_json::Map::new();

    if let Some(raw) = request.full_name.as_deref() {
        let full_name = validate_full_name(raw)?;
        index_patch.insert("fullName".to_owned(), json!(full_name));
        patch.push(("full_name", FieldValue::Text(full_name)));
    }
    if let Some(raw) = request.shop_name.as_deref() {
        let shop_name = validate_shop_name(raw)?;
        if shop_name != shop.shop_name {
            let taken = store
                .get_one(
                    EntityKind::Shop,
                    &vec![("shop_name", Filter::equals(shop_name.as_str()))],
                )
                .await?;
            if taken.is_some() {
                return Err(AppError::Conflict("Shop already exists".to_owned()));
            }
        }
        index_patch.insert("shopName".to_owned(), json!(shop_name));
        patch.push(("shop_name", FieldValue::Text(shop_name)));
    }
    if let Some(raw) = request.address.as_deref() {
        let address = validate_address(raw)?;
        index_patch.insert("address".to_owned(), json!(address));
        patch.push(("address", FieldValue::Text(address)));
    }
    if let Some(raw) = request.contact.as_deref() {
        let contact = validate_contact(raw)?;
        patch.push(("contact", FieldValue::Text(contact)));
    }
    if let Some(description) = request.description.clone() {
        index_patch.insert("description".to_owned(), json!(description.clone()));
        patch.push(("description", FieldValue::Text(description)));
    }
    if let Some(is_open) = request.is_open {
        patch.push(("is_open", FieldValue::Bool(is_open)));
    }
    if let Some(note) = request.note.clone() {
        patch.push(("note", FieldValue::Text(note)));
    }
    match (request.latitude, request.longitude) {
        (Some(latitude), Some(longitude)) => {
            let location = GeoPoint::new(latitude, longitude)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            index_patch.insert("location".to_owned(), json!(location.as_geopoint()));
            patch.push(("latitude", FieldValue::Float(location.latitude)));
            patch.push(("longitude", FieldValue::Float(location.longitude)));
        }
        (None, None) => {}
        _ => {
            return Err(AppError::Validation(
                "Both latitude and longitude are required to move a shop".to_owned(),
            ));
        }
    }

    if patch.is_empty() {
        return Err(AppError::Validation("No new data provided.".to_owned()));
    }

    let identifier: Filters = vec![("shop_id", Filter::equals(request.shop_id))];
    match store
        .update_by_identifier(EntityKind::Shop, &identifier, &patch)
        .await?
    {
        UpdateOutcome::NotFound => Err(AppError::NotFound("Shop not found".to_owned())),
        UpdateOutcome::NoChanges(record) => Ok(Mutation::NoChanges(into_shop(record)?)),
        UpdateOutcome::Updated(record) => {
            let updated = into_shop(record)?;

            state.cache().invalidate(&keys::shop(updated.shop_id)).await;
            state
                .cache()
                .invalidate(&keys::shops_by_owner(updated.owner_id))
                .await;

            if !index_patch.is_empty() {
                let search = state.search().clone();
                let id = updated.shop_id.to_string();
                let document_patch = Value::Object(index_patch);
                propagate("shop.update", async move {
                    search.update_shop(&id, &document_patch).await
                })
                .await;
            }

            Ok(Mutation::Applied(updated))
        }
    }
}

/// Fetch one shop, read-through cached under `shop:<shopId>`.
///
/// # Errors
///
/// `NotFound` if the shop does not exist, store faults otherwise.
pub async fn get_shop(state: &AppState, shop_id: ShopId) -> Result<CachedRead, AppError> {
    let key = keys::shop(shop_id);
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(CachedRead {
            body: (*cached).clone(),
            from_cache: true,
        });
    }

    let shop = load_shop(state.store(), shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_owned()))?;

    let body = serde_json::to_value(&shop).map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache().put(key, body.clone()).await;

    Ok(CachedRead {
        body,
        from_cache: false,
    })
}

/// List an owner's shops, read-through cached under `shops_by_owner:<ownerId>`.
///
/// # Errors
///
/// `NotFound` if the owner has no shops, store faults otherwise.
pub async fn shops_by_owner(state: &AppState, owner_id: UserId) -> Result<CachedRead, AppError> {
    let key = keys::shops_by_owner(owner_id);
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(CachedRead {
            body: (*cached).clone(),
            from_cache: true,
        });
    }

    let records = state
        .store()
        .get_all(
            EntityKind::Shop,
            &vec![("owner_id", Filter::equals(owner_id))],
        )
        .await?;
    if records.is_empty() {
        return Err(AppError::NotFound("No shop found".to_owned()));
    }

    let shops = records
        .into_iter()
        .map(into_shop)
        .collect::<Result<Vec<_>, _>>()?;
    let body = serde_json::to_value(&shops).map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache().put(key, body.clone()).await;

    Ok(CachedRead {
        body,
        from_cache: false,
    })
}

/// Delete a shop.
///
/// # Errors
///
/// Missing shop, authorization failures, a conflict if items still reference
/// the shop, or a store fault.
pub async fn delete_shop(
    state: &AppState,
    session: &Session,
    shop_id: ShopId,
) -> Result<Shop, AppError> {
    let store = state.store();

    let shop = load_shop(store, shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_owned()))?;

    let user = resolve_session_user(store, &session.email).await?;
    ensure_owner(&user, &shop, "You can only delete your own shop.")?;

    let identifier: Filters = vec![("shop_id", Filter::equals(shop_id))];
    match store
        .delete_by_identifier(EntityKind::Shop, &identifier)
        .await?
    {
        DeleteOutcome::NotFound => Err(AppError::NotFound("Shop not found".to_owned())),
        DeleteOutcome::Deleted(record) => {
            let deleted = into_shop(record)?;

            state.cache().invalidate(&keys::shop(shop_id)).await;
            state
                .cache()
                .invalidate(&keys::shops_by_owner(deleted.owner_id))
                .await;

            let search = state.search().clone();
            let id = shop_id.to_string();
            propagate("shop.delete", async move { search.delete_shop(&id).await }).await;

            Ok(deleted)
        }
    }
}
