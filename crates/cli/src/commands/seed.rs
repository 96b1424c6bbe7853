//! Demo-data seeding command.
//!
//! Inserts a vendor, a shopper, a shop with a few items, and inventory rows,
//! then pushes the shop and items into the search index. Safe to re-run: it
//! bails out if the seed vendor already exists.

use chrono::Utc;

use localmart_core::{Email, InventoryId, ItemId, Role, ShopId, StockStatus, UserId};
use localmart_server::config::ServerConfig;
use localmart_server::db::{self, EntityKind, EntityStore, Filter, Record, StoreError};
use localmart_server::models::{Inventory, Item, Shop, User};
use localmart_server::search::{ItemDocument, SearchClient, ShopDocument};
use localmart_server::services::auth::hash_password;

const VENDOR_EMAIL: &str = "vendor@localmart.test";
const SHOPPER_EMAIL: &str = "shopper@localmart.test";

/// Demo password for both seed accounts.
const SEED_PASSWORD: &str = "Localm@rt1";

/// Insert demo data.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the database is
/// unreachable, or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let store = EntityStore::new(pool);
    let search = SearchClient::new(&config.search)?;

    let vendor_email = Email::parse(VENDOR_EMAIL)?;
    let existing = store
        .get_one(
            EntityKind::User,
            &vec![("email", Filter::equals(&vendor_email))],
        )
        .await?;
    if existing.is_some() {
        tracing::info!("seed data already present, nothing to do");
        return Ok(());
    }

    let password_hash = hash_password(SEED_PASSWORD).map_err(|e| e.to_string())?;
    let now = Utc::now();

    let vendor = User {
        id: UserId::generate(),
        email: vendor_email,
        password_hash: password_hash.clone(),
        role: Role::Vendor,
        full_name: Some("Asha Verma".to_owned()),
        created_at: now,
        updated_at: None,
        note: Some("Seed vendor".to_owned()),
    };
    let shopper = User {
        id: UserId::generate(),
        email: Email::parse(SHOPPER_EMAIL)?,
        password_hash,
        role: Role::User,
        full_name: Some("Ravi Kumar".to_owned()),
        created_at: now,
        updated_at: None,
        note: Some("Seed shopper".to_owned()),
    };
    let shop = Shop {
        shop_id: ShopId::generate(),
        owner_id: vendor.id,
        full_name: "Asha Verma".to_owned(),
        shop_name: "Verma Handicrafts".to_owned(),
        address: "14 Bazaar Road, Jaipur".to_owned(),
        contact: Some("+91 98765 43210".to_owned()),
        description: Some("Handmade scarves, rugs, and pottery".to_owned()),
        is_open: true,
        latitude: 26.9124,
        longitude: 75.7873,
        created_at: now,
        updated_at: None,
        note: None,
    };

    let items = [
        ("Scarf", 1250.0, Some("Handwoven wool scarf")),
        ("Rug", 4800.0, Some("Dhurrie rug, 4x6")),
        ("Clay Pot", 350.0, None),
    ]
    .map(|(name, price, description)| Item {
        id: ItemId::generate(),
        shop_id: shop.shop_id,
        item_name: name.to_owned(),
        price,
        description: description.map(ToOwned::to_owned),
        note: None,
    });

    let mut tx = store.begin().await?;
    store.insert(&mut *tx, &Record::User(vendor.clone())).await?;
    store.insert(&mut *tx, &Record::User(shopper)).await?;
    store.insert(&mut *tx, &Record::Shop(shop.clone())).await?;
    for item in &items {
        store.insert(&mut *tx, &Record::Item(item.clone())).await?;
        let inventory = Inventory {
            inventory_id: InventoryId::generate(),
            shop_id: shop.shop_id,
            item_id: item.id,
            quantity: 25,
            price_at_entry: Some(item.price),
            last_restocked_at: Some(now),
            min_quantity: Some(5),
            max_quantity: Some(100),
            status: StockStatus::InStock,
            location: None,
            batch_number: None,
            expiry_date: None,
            updated_at: None,
            note: None,
        };
        store.insert(&mut *tx, &Record::Inventory(inventory)).await?;
    }
    tx.commit().await.map_err(StoreError::Database)?;

    // index the seeded records; failures here are recoverable via sync-search
    if let Err(error) = search.ensure_collections().await {
        tracing::warn!(%error, "search backend unavailable, run sync-search later");
        return Ok(());
    }
    search.upsert_shop(&ShopDocument::from_shop(&shop)).await?;
    for item in &items {
        search.upsert_item(&ItemDocument::from_item(item)).await?;
    }

    tracing::info!(vendor = VENDOR_EMAIL, shop = %shop.shop_name, "seed data inserted");
    Ok(())
}
