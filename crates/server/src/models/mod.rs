//! Domain entity models.
//!
//! One struct per record kind the Entity Store persists. Row mapping is done
//! by hand (`FromRow` impls) so database text columns are converted into the
//! typed wrappers from `localmart-core` at the boundary.

pub mod inventory;
pub mod item;
pub mod session;
pub mod shop;
pub mod user;

pub use inventory::Inventory;
pub use item::Item;
pub use session::Session;
pub use shop::Shop;
pub use user::User;

/// Decode a TEXT column into a `FromStr` domain type, reporting failures as
/// column-decode errors rather than panicking on unexpected database content.
pub(crate) fn decode_text_column<T>(column: &str, raw: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    raw.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_owned(),
        source: e.into(),
    })
}
