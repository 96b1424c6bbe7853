//! Search-index rebuild command.
//!
//! Drops and recreates both collections, then re-indexes every shop and item
//! straight from the relational store. This is the manual recovery path for
//! the gaps best-effort propagation leaves behind: failed index writes are
//! only logged at request time, and this command walks the source of truth
//! to bring the index back in line.

use localmart_server::config::ServerConfig;
use localmart_server::db::{self, EntityKind, EntityStore, Record};
use localmart_server::search::{ItemDocument, SearchClient, ShopDocument};

/// Rows fetched from the store per batch.
const BATCH_SIZE: i64 = 100;

/// Rebuild the search index from the relational store.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the database is
/// unreachable, or the search backend rejects a write. A partial rebuild can
/// simply be re-run.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let store = EntityStore::new(pool);
    let search = SearchClient::new(&config.search)?;

    search.reset_collections().await?;
    tracing::info!("search collections recreated");

    let mut shops = 0usize;
    let mut offset = 0i64;
    loop {
        let (records, _) = store.get_page(EntityKind::Shop, offset, BATCH_SIZE).await?;
        if records.is_empty() {
            break;
        }
        for record in &records {
            if let Record::Shop(shop) = record {
                search.upsert_shop(&ShopDocument::from_shop(shop)).await?;
                shops += 1;
            }
        }
        offset += BATCH_SIZE;
    }

    let mut items = 0usize;
    let mut offset = 0i64;
    loop {
        let (records, _) = store.get_page(EntityKind::Item, offset, BATCH_SIZE).await?;
        if records.is_empty() {
            break;
        }
        for record in &records {
            if let Record::Item(item) = record {
                search.upsert_item(&ItemDocument::from_item(item)).await?;
                items += 1;
            }
        }
        offset += BATCH_SIZE;
    }

    tracing::info!(shops, items, "search index rebuilt");
    Ok(())
}
