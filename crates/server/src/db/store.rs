//! Generic Entity Store over the five record kinds.
//!
//! A uniform data-access layer: callers name a record kind and describe
//! filters or field patches as data, and the store builds the SQL at runtime
//! with bound parameters. The kind is a closed sum type, so every code path
//! matches exhaustively and an unrecognized kind cannot exist at runtime.
//!
//! Field names in filters and patches are screened against a per-kind column
//! allow-list; names that are not columns of the kind are silently skipped.
//! The allow-list is also what keeps dynamically assembled SQL injection-free:
//! only compile-time column literals are ever pushed into a query string,
//! values always go through bind parameters.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use localmart_core::{
    Email, InventoryId, ItemId, Role, SessionToken, ShopId, StockStatus, UserId,
};

use super::StoreError;
use crate::models::{Inventory, Item, Session, Shop, User};

// =============================================================================
// Kinds, values, filters
// =============================================================================

/// The closed set of record kinds the store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Session,
    Shop,
    Item,
    Inventory,
}

impl EntityKind {
    /// Table backing this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Session => "sessions",
            Self::Shop => "shops",
            Self::Item => "items",
            Self::Inventory => "inventories",
        }
    }

    /// Column allow-list for this kind.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::User => &[
                "id",
                "email",
                "password",
                "role",
                "full_name",
                "created_at",
                "updated_at",
                "note",
            ],
            Self::Session => &[
                "token",
                "email",
                "role",
                "ip",
                "browser",
                "os",
                "created_at",
                "expires_at",
            ],
            Self::Shop => &[
                "shop_id",
                "owner_id",
                "full_name",
                "shop_name",
                "address",
                "contact",
                "description",
                "is_open",
                "latitude",
                "longitude",
                "created_at",
                "updated_at",
                "note",
            ],
            Self::Item => &["id", "shop_id", "item_name", "price", "description", "note"],
            Self::Inventory => &[
                "inventory_id",
                "shop_id",
                "item_id",
                "quantity",
                "price_at_entry",
                "last_restocked_at",
                "min_quantity",
                "max_quantity",
                "status",
                "location",
                "batch_number",
                "expiry_date",
                "updated_at",
                "note",
            ],
        }
    }

    fn has_column(self, name: &str) -> bool {
        self.columns().iter().any(|column| *column == name)
    }
}

/// A single column value, as the store sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Uuid(Uuid),
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl FieldValue {
    fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Self::Null, |v| Self::Text(v.to_owned()))
    }

    fn opt_int(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Int)
    }

    fn opt_float(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Float)
    }

    fn opt_timestamp(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Null, Self::Timestamp)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<UserId> for FieldValue {
    fn from(value: UserId) -> Self {
        Self::Uuid(value.as_uuid())
    }
}

impl From<ShopId> for FieldValue {
    fn from(value: ShopId) -> Self {
        Self::Uuid(value.as_uuid())
    }
}

impl From<ItemId> for FieldValue {
    fn from(value: ItemId) -> Self {
        Self::Uuid(value.as_uuid())
    }
}

impl From<InventoryId> for FieldValue {
    fn from(value: InventoryId) -> Self {
        Self::Uuid(value.as_uuid())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&Email> for FieldValue {
    fn from(value: &Email) -> Self {
        Self::Text(value.as_str().to_owned())
    }
}

impl From<&SessionToken> for FieldValue {
    fn from(value: &SessionToken) -> Self {
        Self::Text(value.as_str().to_owned())
    }
}

impl From<Role> for FieldValue {
    fn from(value: Role) -> Self {
        Self::Text(value.as_str().to_owned())
    }
}

impl From<StockStatus> for FieldValue {
    fn from(value: StockStatus) -> Self {
        Self::Text(value.as_str().to_owned())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// A filter over one column: scalar equality, list membership, or IS-NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(FieldValue),
    In(Vec<FieldValue>),
    IsNull,
}

impl Filter {
    /// Equality against a scalar value.
    pub fn equals(value: impl Into<FieldValue>) -> Self {
        Self::Eq(value.into())
    }

    /// Membership in a list of values. An empty list matches nothing.
    pub fn one_of<T: Into<FieldValue>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::In(values.into_iter().map(Into::into).collect())
    }
}

/// Column filters, applied conjunctively.
pub type Filters = Vec<(&'static str, Filter)>;

/// Target fields for an update.
pub type FieldPatch = Vec<(&'static str, FieldValue)>;

// =============================================================================
// Records
// =============================================================================

/// A typed record of one of the five kinds.
#[derive(Debug, Clone)]
pub enum Record {
    User(User),
    Session(Session),
    Shop(Shop),
    Item(Item),
    Inventory(Inventory),
}

impl Record {
    /// The kind of this record.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::Session(_) => EntityKind::Session,
            Self::Shop(_) => EntityKind::Shop,
            Self::Item(_) => EntityKind::Item,
            Self::Inventory(_) => EntityKind::Inventory,
        }
    }

    /// The value of one column, or `None` if the kind has no such column.
    #[must_use]
    pub fn field(&self, column: &str) -> Option<FieldValue> {
        match self {
            Self::User(user) => user_field(user, column),
            Self::Session(session) => session_field(session, column),
            Self::Shop(shop) => shop_field(shop, column),
            Self::Item(item) => item_field(item, column),
            Self::Inventory(inventory) => inventory_field(inventory, column),
        }
    }

    fn from_pg_row(kind: EntityKind, row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(match kind {
            EntityKind::User => Self::User(User::from_row(row)?),
            EntityKind::Session => Self::Session(Session::from_row(row)?),
            EntityKind::Shop => Self::Shop(Shop::from_row(row)?),
            EntityKind::Item => Self::Item(Item::from_row(row)?),
            EntityKind::Inventory => Self::Inventory(Inventory::from_row(row)?),
        })
    }
}

fn user_field(user: &User, column: &str) -> Option<FieldValue> {
    Some(match column {
        "id" => FieldValue::Uuid(user.id.as_uuid()),
        "email" => FieldValue::Text(user.email.as_str().to_owned()),
        "password" => FieldValue::Text(user.password_hash.clone()),
        "role" => FieldValue::Text(user.role.as_str().to_owned()),
        "full_name" => FieldValue::opt_text(user.full_name.as_deref()),
        "created_at" => FieldValue::Timestamp(user.created_at),
        "updated_at" => FieldValue::opt_timestamp(user.updated_at),
        "note" => FieldValue::opt_text(user.note.as_deref()),
        _ => return None,
    })
}

fn session_field(session: &Session, column: &str) -> Option<FieldValue> {
    Some(match column {
        "token" => FieldValue::Text(session.token.as_str().to_owned()),
        "email" => FieldValue::Text(session.email.as_str().to_owned()),
        "role" => FieldValue::Text(session.role.as_str().to_owned()),
        "ip" => FieldValue::opt_text(session.ip.as_deref()),
        "browser" => FieldValue::opt_text(session.browser.as_deref()),
        "os" => FieldValue::opt_text(session.os.as_deref()),
        "created_at" => FieldValue::Timestamp(session.created_at),
        "expires_at" => FieldValue::Timestamp(session.expires_at),
        _ => return None,
    })
}

fn shop_field(shop: &Shop, column: &str) -> Option<FieldValue> {
    Some(match column {
        "shop_id" => FieldValue::Uuid(shop.shop_id.as_uuid()),
        "owner_id" => FieldValue::Uuid(shop.owner_id.as_uuid()),
        "full_name" => FieldValue::Text(shop.full_name.clone()),
        "shop_name" => FieldValue::Text(shop.shop_name.clone()),
        "address" => FieldValue::Text(shop.address.clone()),
        "contact" => FieldValue::opt_text(shop.contact.as_deref()),
        "description" => FieldValue::opt_text(shop.description.as_deref()),
        "is_open" => FieldValue::Bool(shop.is_open),
        "latitude" => FieldValue::Float(shop.latitude),
        "longitude" => FieldValue::Float(shop.longitude),
        "created_at" => FieldValue::Timestamp(shop.created_at),
        "updated_at" => FieldValue::opt_timestamp(shop.updated_at),
        "note" => FieldValue::opt_text(shop.note.as_deref()),
        _ => return None,
    })
}

fn item_field(item: &Item, column: &str) -> Option<FieldValue> {
    Some(match column {
        "id" => FieldValue::Uuid(item.id.as_uuid()),
        "shop_id" => FieldValue::Uuid(item.shop_id.as_uuid()),
        "item_name" => FieldValue::Text(item.item_name.clone()),
        "price" => FieldValue::Float(item.price),
        "description" => FieldValue::opt_text(item.description.as_deref()),
        "note" => FieldValue::opt_text(item.note.as_deref()),
        _ => return None,
    })
}

fn inventory_field(inventory: &Inventory, column: &str) -> Option<FieldValue> {
    Some(match column {
        "inventory_id" => FieldValue::Uuid(inventory.inventory_id.as_uuid()),
        "shop_id" => FieldValue::Uuid(inventory.shop_id.as_uuid()),
        "item_id" => FieldValue::Uuid(inventory.item_id.as_uuid()),
        "quantity" => FieldValue::Int(inventory.quantity),
        "price_at_entry" => FieldValue::opt_float(inventory.price_at_entry),
        "last_restocked_at" => FieldValue::opt_timestamp(inventory.last_restocked_at),
        "min_quantity" => FieldValue::opt_int(inventory.min_quantity),
        "max_quantity" => FieldValue::opt_int(inventory.max_quantity),
        "status" => FieldValue::Text(inventory.status.as_str().to_owned()),
        "location" => FieldValue::opt_text(inventory.location.as_deref()),
        "batch_number" => FieldValue::opt_text(inventory.batch_number.as_deref()),
        "expiry_date" => FieldValue::opt_timestamp(inventory.expiry_date),
        "updated_at" => FieldValue::opt_timestamp(inventory.updated_at),
        "note" => FieldValue::opt_text(inventory.note.as_deref()),
        _ => return None,
    })
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of an update-by-identifier call.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Fields were applied and committed; carries the refreshed record.
    Updated(Record),
    /// Every target field already held its requested value; nothing was
    /// written. This is the idempotence short-circuit, not an error.
    NoChanges(Record),
    /// No record matched the identifier.
    NotFound,
}

/// Result of a delete-by-identifier call.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The record was deleted; carries its last state.
    Deleted(Record),
    /// No record matched the identifier.
    NotFound,
}

// =============================================================================
// EntityStore
// =============================================================================

/// Uniform persistence interface over the five record kinds.
///
/// Reads run directly against the pool. Inserts are staged on a
/// caller-provided executor so the caller controls the transaction boundary;
/// update and delete load the target record, act, and commit themselves.
#[derive(Clone)]
pub struct EntityStore {
    pool: PgPool,
}

impl EntityStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction. The caller commits; dropping the transaction
    /// without committing rolls back.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if a connection cannot be acquired.
    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, Postgres>, StoreError> {
        Ok(self.pool.begin().await?)
    }

    /// Persist a record on the given executor.
    ///
    /// Run inside a caller-held transaction when the surrounding operation
    /// has pre-checks that must commit atomically with the write.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` on unique or reference violations,
    /// `StoreError::Database` for any other persistence fault.
    pub async fn insert<'e, E>(&self, executor: E, record: &Record) -> Result<(), StoreError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let mut builder = insert_builder(record);
        builder
            .build()
            .execute(executor)
            .await
            .map_err(map_constraint_violation)?;
        Ok(())
    }

    /// Fetch the first record matching the filters.
    ///
    /// Ordering among multiple matches is implementation-defined; callers
    /// must not depend on it when filters are non-unique.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn get_one(
        &self,
        kind: EntityKind,
        filters: &Filters,
    ) -> Result<Option<Record>, StoreError> {
        let mut builder = select_builder(kind, filters);
        builder.push(" LIMIT 1");

        let row = builder.build().fetch_optional(&self.pool).await?;
        Ok(row
            .map(|r| Record::from_pg_row(kind, &r))
            .transpose()?)
    }

    /// Fetch all records matching the filters. Returns an empty vec, never
    /// an error, when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn get_all(
        &self,
        kind: EntityKind,
        filters: &Filters,
    ) -> Result<Vec<Record>, StoreError> {
        let mut builder = select_builder(kind, filters);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| Record::from_pg_row(kind, row).map_err(StoreError::Database))
            .collect()
    }

    /// Fetch one page of records plus the unfiltered total count at call
    /// time. Concurrent writes may shift slices between calls; no snapshot
    /// isolation is guaranteed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if either query fails.
    pub async fn get_page(
        &self,
        kind: EntityKind,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Record>, i64), StoreError> {
        let mut builder = QueryBuilder::new(format!("SELECT * FROM {}", kind.table()));
        builder.push(" OFFSET ");
        builder.push_bind(offset);
        builder.push(" LIMIT ");
        builder.push_bind(limit);

        let rows = builder.build().fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(|row| Record::from_pg_row(kind, row))
            .collect::<Result<Vec<_>, _>>()?;

        let count_sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let total: i64 = sqlx::query_scalar(&count_sql).fetch_one(&self.pool).await?;

        Ok((records, total))
    }

    /// Load the record matching `identifier`, compare each patch field to
    /// its current value, and apply the changed ones.
    ///
    /// When every target field already equals its requested value the call
    /// short-circuits with [`UpdateOutcome::NoChanges`] and performs no
    /// write. `updated_at` is stamped automatically on kinds that carry it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` on constraint violations,
    /// `StoreError::Database` for other persistence faults. The in-flight
    /// transaction is rolled back in both cases.
    pub async fn update_by_identifier(
        &self,
        kind: EntityKind,
        identifier: &Filters,
        patch: &FieldPatch,
    ) -> Result<UpdateOutcome, StoreError> {
        let Some(current) = self.get_one(kind, identifier).await? else {
            return Ok(UpdateOutcome::NotFound);
        };

        let changes = changed_fields(&current, patch);
        if changes.is_empty() {
            return Ok(UpdateOutcome::NoChanges(current));
        }

        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", kind.table()));
        for (i, (column, value)) in changes.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column);
            builder.push(" = ");
            push_bind_value(&mut builder, value);
        }
        if kind.has_column("updated_at") && !changes.iter().any(|(column, _)| *column == "updated_at")
        {
            builder.push(", updated_at = ");
            builder.push_bind(Utc::now());
        }
        push_filters(&mut builder, kind, identifier);

        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(map_constraint_violation)?;
        tx.commit().await?;

        let refreshed = self.get_one(kind, identifier).await?.unwrap_or(current);
        Ok(UpdateOutcome::Updated(refreshed))
    }

    /// Load the record matching `identifier` and delete it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if other rows still reference the
    /// record, `StoreError::Database` for other persistence faults.
    pub async fn delete_by_identifier(
        &self,
        kind: EntityKind,
        identifier: &Filters,
    ) -> Result<DeleteOutcome, StoreError> {
        let Some(existing) = self.get_one(kind, identifier).await? else {
            return Ok(DeleteOutcome::NotFound);
        };

        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::new(format!("DELETE FROM {}", kind.table()));
        push_filters(&mut builder, kind, identifier);

        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(map_constraint_violation)?;
        tx.commit().await?;

        Ok(DeleteOutcome::Deleted(existing))
    }
}

// =============================================================================
// SQL assembly
// =============================================================================

/// The subset of `patch` whose values differ from the record's current ones.
/// Patch entries naming unknown columns are dropped, not counted as changes.
#[must_use]
pub fn changed_fields(current: &Record, patch: &FieldPatch) -> FieldPatch {
    let kind = current.kind();
    patch
        .iter()
        .filter(|(column, value)| {
            kind.has_column(column) && current.field(column).as_ref() != Some(value)
        })
        .cloned()
        .collect()
}

fn insert_builder(record: &Record) -> QueryBuilder<'static, Postgres> {
    let kind = record.kind();
    let present: Vec<(&'static str, FieldValue)> = kind
        .columns()
        .iter()
        .filter_map(|column| record.field(column).map(|value| (*column, value)))
        .collect();

    let mut builder = QueryBuilder::new(format!("INSERT INTO {} (", kind.table()));
    for (i, (column, _)) in present.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(*column);
    }
    builder.push(") VALUES (");
    for (i, (_, value)) in present.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_bind_value(&mut builder, value);
    }
    builder.push(")");
    builder
}

fn select_builder(kind: EntityKind, filters: &Filters) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT * FROM {}", kind.table()));
    push_filters(&mut builder, kind, filters);
    builder
}

fn push_filters(builder: &mut QueryBuilder<'static, Postgres>, kind: EntityKind, filters: &Filters) {
    let mut first = true;
    for (column, filter) in filters {
        if !kind.has_column(column) {
            continue;
        }
        builder.push(if first { " WHERE " } else { " AND " });
        first = false;
        builder.push(*column);

        match filter {
            Filter::Eq(FieldValue::Null) | Filter::IsNull => {
                builder.push(" IS NULL");
            }
            Filter::Eq(value) => {
                builder.push(" = ");
                push_bind_value(builder, value);
            }
            Filter::In(values) => {
                builder.push(" IN (");
                if values.is_empty() {
                    // NULL membership matches no row
                    builder.push("NULL");
                }
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        builder.push(", ");
                    }
                    push_bind_value(builder, value);
                }
                builder.push(")");
            }
        }
    }
}

fn push_bind_value(builder: &mut QueryBuilder<'static, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Uuid(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Text(v) => {
            builder.push_bind(v.clone());
        }
        FieldValue::Int(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Float(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Bool(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Timestamp(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Null => {
            builder.push("NULL");
        }
    }
}

fn map_constraint_violation(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return StoreError::Conflict("unique constraint violated".to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::Conflict("referenced record does not exist".to_owned());
        }
    }
    StoreError::Database(e)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use localmart_core::Email;

    fn sample_item() -> Item {
        Item {
            id: ItemId::generate(),
            shop_id: ShopId::generate(),
            item_name: "Scarf".to_owned(),
            price: 1250.0,
            description: Some("Handwoven wool scarf".to_owned()),
            note: None,
        }
    }

    fn sample_session(expires_at: DateTime<Utc>) -> Session {
        Session {
            token: SessionToken::generate(),
            email: Email::parse("vendor@example.com").unwrap(),
            role: Role::Vendor,
            ip: None,
            browser: None,
            os: None,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_kind_tables() {
        assert_eq!(EntityKind::User.table(), "users");
        assert_eq!(EntityKind::Inventory.table(), "inventories");
    }

    #[test]
    fn test_record_kind_matches_variant() {
        let record = Record::Item(sample_item());
        assert_eq!(record.kind(), EntityKind::Item);

        let record = Record::Session(sample_session(Utc::now()));
        assert_eq!(record.kind(), EntityKind::Session);
    }

    #[test]
    fn test_record_field_known_columns() {
        let item = sample_item();
        let record = Record::Item(item.clone());

        assert_eq!(
            record.field("item_name"),
            Some(FieldValue::Text("Scarf".to_owned()))
        );
        assert_eq!(record.field("price"), Some(FieldValue::Float(1250.0)));
        assert_eq!(record.field("note"), Some(FieldValue::Null));
        assert_eq!(record.field("id"), Some(FieldValue::Uuid(item.id.as_uuid())));
    }

    #[test]
    fn test_record_field_unknown_column() {
        let record = Record::Item(sample_item());
        assert_eq!(record.field("quantity"), None);
        assert_eq!(record.field("definitely_not_a_column"), None);
    }

    #[test]
    fn test_changed_fields_empty_when_identical() {
        let record = Record::Item(sample_item());
        let patch: FieldPatch = vec![
            ("price", FieldValue::Float(1250.0)),
            ("description", FieldValue::Text("Handwoven wool scarf".to_owned())),
        ];
        assert!(changed_fields(&record, &patch).is_empty());
    }

    #[test]
    fn test_changed_fields_detects_difference() {
        let record = Record::Item(sample_item());
        let patch: FieldPatch = vec![
            ("price", FieldValue::Float(999.0)),
            ("description", FieldValue::Text("Handwoven wool scarf".to_owned())),
        ];
        let changes = changed_fields(&record, &patch);
        assert_eq!(changes, vec![("price", FieldValue::Float(999.0))]);
    }

    #[test]
    fn test_changed_fields_null_transition() {
        let record = Record::Item(sample_item());
        // note is currently NULL; setting it is a change, clearing it is not
        let changes = changed_fields(
            &record,
            &vec![("note", FieldValue::Text("seasonal".to_owned()))],
        );
        assert_eq!(changes.len(), 1);

        let changes = changed_fields(&record, &vec![("note", FieldValue::Null)]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_changed_fields_skips_unknown_columns() {
        let record = Record::Item(sample_item());
        let changes = changed_fields(&record, &vec![("quantity", FieldValue::Int(5))]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_select_builder_scalar_and_null_filters() {
        let filters: Filters = vec![
            ("shop_id", Filter::equals(ShopId::generate())),
            ("note", Filter::IsNull),
        ];
        let builder = select_builder(EntityKind::Item, &filters);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM items WHERE shop_id = $1 AND note IS NULL"
        );
    }

    #[test]
    fn test_select_builder_membership_filter() {
        let filters: Filters = vec![(
            "shop_id",
            Filter::one_of(vec![ShopId::generate(), ShopId::generate()]),
        )];
        let builder = select_builder(EntityKind::Shop, &filters);
        assert_eq!(builder.sql(), "SELECT * FROM shops WHERE shop_id IN ($1, $2)");
    }

    #[test]
    fn test_select_builder_empty_membership_matches_nothing() {
        let filters: Filters = vec![("shop_id", Filter::In(vec![]))];
        let builder = select_builder(EntityKind::Shop, &filters);
        assert_eq!(builder.sql(), "SELECT * FROM shops WHERE shop_id IN (NULL)");
    }

    #[test]
    fn test_select_builder_skips_unknown_columns() {
        let filters: Filters = vec![
            ("no_such_column", Filter::equals("x")),
            ("item_name", Filter::equals("Scarf")),
        ];
        let builder = select_builder(EntityKind::Item, &filters);
        assert_eq!(builder.sql(), "SELECT * FROM items WHERE item_name = $1");
    }

    #[test]
    fn test_select_builder_no_filters() {
        let builder = select_builder(EntityKind::User, &vec![]);
        assert_eq!(builder.sql(), "SELECT * FROM users");
    }

    #[test]
    fn test_eq_null_is_null_test() {
        let filters: Filters = vec![("note", Filter::Eq(FieldValue::Null))];
        let builder = select_builder(EntityKind::Item, &filters);
        assert_eq!(builder.sql(), "SELECT * FROM items WHERE note IS NULL");
    }

    #[test]
    fn test_insert_builder_covers_all_columns() {
        let record = Record::Item(sample_item());
        let builder = insert_builder(&record);
        assert_eq!(
            builder.sql(),
            "INSERT INTO items (id, shop_id, item_name, price, description, note) \
             VALUES ($1, $2, $3, $4, $5, NULL)"
        );
    }

    #[test]
    fn test_filter_one_of_builds_values() {
        let filter = Filter::one_of(vec!["a", "b"]);
        assert_eq!(
            filter,
            Filter::In(vec![
                FieldValue::Text("a".to_owned()),
                FieldValue::Text("b".to_owned())
            ])
        );
    }
}
