//! Read-through response cache for hot read paths.
//!
//! Keys are colon-delimited strings, values are the JSON response bodies the
//! read paths serve. Every entry carries the same fixed TTL, which is the
//! self-healing bound on staleness: a cache entry that survives a missed
//! invalidation still expires on its own.
//!
//! Invalidation targets exact keys, except for the paginated item listing,
//! which is invalidated in bulk (`all_items:*`) because any item write shifts
//! pagination offsets.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

use localmart_core::{ShopId, UserId};

/// Fixed time-to-live for every cache entry.
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Maximum number of cached response bodies.
const CACHE_CAPACITY: u64 = 10_000;

/// Cache key builders for the four key families.
pub mod keys {
    use super::{ShopId, UserId};

    /// Prefix shared by all paginated item-listing keys.
    pub const ALL_ITEMS_PREFIX: &str = "all_items:";

    #[must_use]
    pub fn item(item_name: &str) -> String {
        format!("item:{item_name}")
    }

    #[must_use]
    pub fn items_page(page: i64, page_size: i64) -> String {
        format!("{ALL_ITEMS_PREFIX}page_{page}:size_{page_size}")
    }

    #[must_use]
    pub fn shop(shop_id: ShopId) -> String {
        format!("shop:{shop_id}")
    }

    #[must_use]
    pub fn shops_by_owner(owner_id: UserId) -> String {
        format!("shops_by_owner:{owner_id}")
    }
}

/// Key/value cache over JSON response bodies.
///
/// Constructed once at process start and shared through `AppState`; entries
/// are read and written from any request without additional locking.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<String, Arc<Value>>,
}

impl ResponseCache {
    /// Create a cache with the fixed TTL and default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// Create a cache with an explicit TTL (used by tests).
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        Self { inner }
    }

    /// Look up a cached body.
    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        self.inner.get(key).await
    }

    /// Store a response body under a key.
    pub async fn put(&self, key: String, body: Value) {
        self.inner.insert(key, Arc::new(body)).await;
    }

    /// Drop a single key.
    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Drop every key starting with `prefix`.
    ///
    /// Failures are logged and swallowed; a missed invalidation is bounded
    /// by the entry TTL.
    pub fn invalidate_prefix(&self, prefix: &'static str) {
        if let Err(error) = self
            .inner
            .invalidate_entries_if(move |key, _| key.starts_with(prefix))
        {
            tracing::warn!(%error, prefix, "cache prefix invalidation failed");
        }
    }

    /// Flush pending maintenance work. Test helper; production reads and
    /// writes let moka schedule this itself.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_formats() {
        let shop_id = ShopId::generate();
        let owner_id = UserId::generate();

        assert_eq!(keys::item("Scarf"), "item:Scarf");
        assert_eq!(keys::items_page(2, 20), "all_items:page_2:size_20");
        assert_eq!(keys::shop(shop_id), format!("shop:{shop_id}"));
        assert_eq!(
            keys::shops_by_owner(owner_id),
            format!("shops_by_owner:{owner_id}")
        );
        assert!(keys::items_page(1, 10).starts_with(keys::ALL_ITEMS_PREFIX));
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let cache = ResponseCache::new();
        cache.put("item:Scarf".to_owned(), json!({"price": 1250.0})).await;

        let cached = cache.get("item:Scarf").await.unwrap();
        assert_eq!(*cached, json!({"price": 1250.0}));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache = ResponseCache::new();
        assert!(cache.get("item:Nope").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_single_key() {
        let cache = ResponseCache::new();
        cache.put("shop:abc".to_owned(), json!({})).await;
        cache.invalidate("shop:abc").await;
        assert!(cache.get("shop:abc").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_prefix_drops_all_pages() {
        let cache = ResponseCache::new();
        cache.put(keys::items_page(1, 20), json!({"page": 1})).await;
        cache.put(keys::items_page(2, 20), json!({"page": 2})).await;
        cache.put("item:Scarf".to_owned(), json!({})).await;

        cache.invalidate_prefix(keys::ALL_ITEMS_PREFIX);
        cache.run_pending_tasks().await;

        assert!(cache.get(&keys::items_page(1, 20)).await.is_none());
        assert!(cache.get(&keys::items_page(2, 20)).await.is_none());
        // unrelated keys survive
        assert!(cache.get("item:Scarf").await.is_some());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = ResponseCache::with_ttl(Duration::from_millis(10));
        cache.put("item:Scarf".to_owned(), json!({})).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.run_pending_tasks().await;

        assert!(cache.get("item:Scarf").await.is_none());
    }
}
