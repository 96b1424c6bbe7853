//! Search-index client and best-effort propagation.
//!
//! The index is a secondary, eventually-consistent store: every mutation of a
//! shop or item is propagated to it after the relational commit, and a failed
//! propagation is logged and swallowed - it never fails the request and never
//! rolls back the committed write. There is no retry queue or reconciliation
//! pass; the `sync-search` CLI command rebuilds the index from the store when
//! the gap matters.
//!
//! The client talks to a Typesense-compatible HTTP API with a short
//! connection timeout, so a degraded search backend adds bounded latency
//! instead of blocking request completion.

pub mod documents;

pub use documents::{ITEMS_COLLECTION, ItemDocument, SHOPS_COLLECTION, ShopDocument};

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;

use crate::config::SearchConfig;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

/// Connection timeout; on expiry the call is treated as a propagation failure.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Overall per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Items fetched per text search (first phase of nearby search).
const ITEM_SEARCH_PAGE: &str = "250";

/// Shops returned per geo search (second phase of nearby search).
const SHOP_SEARCH_PAGE: &str = "50";

/// Errors from the search backend.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Transport-level failure (connect, timeout, body read, decode).
    #[error("search transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("search backend returned {status}: {body}")]
    Backend { status: u16, body: String },
}

/// Await a propagation future; log failure, never return it.
///
/// Every index side effect in the mutation path goes through this wrapper,
/// which is what structurally enforces the fire-and-log contract.
pub async fn propagate<F>(op: &'static str, fut: F)
where
    F: Future<Output = Result<(), SearchError>>,
{
    if let Err(error) = fut.await {
        tracing::warn!(%error, op, "search index propagation failed");
    }
}

/// Client for the search backend.
///
/// Cheaply cloneable; constructed once at process start and shared through
/// `AppState` for the lifetime of the process.
#[derive(Clone)]
pub struct SearchClient {
    inner: Arc<SearchClientInner>,
}

struct SearchClientInner {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    hits: Vec<SearchHit<T>>,
}

#[derive(Deserialize)]
struct SearchHit<T> {
    document: T,
}

impl SearchClient {
    /// Create a new search client.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(SearchClientInner {
                http,
                base_url: config.base_url(),
                api_key: config.api_key.expose_secret().to_owned(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SearchError::Backend {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Create the shops and items collections if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` if the backend is unreachable or rejects a
    /// schema for a reason other than "already exists".
    pub async fn ensure_collections(&self) -> Result<(), SearchError> {
        for schema in [documents::shops_schema(), documents::items_schema()] {
            match self.create_collection(&schema).await {
                Ok(()) | Err(SearchError::Backend { status: 409, .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Drop and recreate both collections. Used by the index rebuild command.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` if the backend is unreachable or rejects a
    /// schema.
    pub async fn reset_collections(&self) -> Result<(), SearchError> {
        for name in [SHOPS_COLLECTION, ITEMS_COLLECTION] {
            match self.delete_collection(name).await {
                Ok(()) | Err(SearchError::Backend { status: 404, .. }) => {}
                Err(e) => return Err(e),
            }
        }
        for schema in [documents::shops_schema(), documents::items_schema()] {
            self.create_collection(&schema).await?;
        }
        Ok(())
    }

    async fn create_collection(&self, schema: &Value) -> Result<(), SearchError> {
        let response = self
            .inner
            .http
            .post(self.url("/collections"))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .json(schema)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), SearchError> {
        let response = self
            .inner
            .http
            .delete(self.url(&format!("/collections/{name}")))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Create or replace a shop document.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or backend rejection.
    pub async fn upsert_shop(&self, document: &ShopDocument) -> Result<(), SearchError> {
        self.upsert_document(SHOPS_COLLECTION, document).await
    }

    /// Partially update a shop document by id.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or backend rejection.
    pub async fn update_shop(&self, shop_id: &str, patch: &Value) -> Result<(), SearchError> {
        self.update_document(SHOPS_COLLECTION, shop_id, patch).await
    }

    /// Delete a shop document by id. A document that was never indexed is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or backend rejection.
    pub async fn delete_shop(&self, shop_id: &str) -> Result<(), SearchError> {
        self.delete_document(SHOPS_COLLECTION, shop_id).await
    }

    /// Create or replace an item document.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or backend rejection.
    pub async fn upsert_item(&self, document: &ItemDocument) -> Result<(), SearchError> {
        self.upsert_document(ITEMS_COLLECTION, document).await
    }

    /// Partially update an item document by id.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or backend rejection.
    pub async fn update_item(&self, item_id: &str, patch: &Value) -> Result<(), SearchError> {
        self.update_document(ITEMS_COLLECTION, item_id, patch).await
    }

    /// Delete an item document by id. A document that was never indexed is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or backend rejection.
    pub async fn delete_item(&self, item_id: &str) -> Result<(), SearchError> {
        self.delete_document(ITEMS_COLLECTION, item_id).await
    }

    async fn upsert_document<T: serde::Serialize + Sync>(
        &self,
        collection: &str,
        document: &T,
    ) -> Result<(), SearchError> {
        let response = self
            .inner
            .http
            .post(self.url(&format!("/collections/{collection}/documents")))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .query(&[("action", "upsert")])
            .json(document)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: &Value,
    ) -> Result<(), SearchError> {
        let response = self
            .inner
            .http
            .patch(self.url(&format!("/collections/{collection}/documents/{id}")))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .json(patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), SearchError> {
        let response = self
            .inner
            .http
            .delete(self.url(&format!("/collections/{collection}/documents/{id}")))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .send()
            .await?;
        match Self::check(response).await {
            Ok(_) | Err(SearchError::Backend { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Text-match items by name and description.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or backend rejection.
    pub async fn search_items(&self, query: &str) -> Result<Vec<ItemDocument>, SearchError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("/collections/{ITEMS_COLLECTION}/documents/search")))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .query(&[
                ("q", query),
                ("query_by", "itemName,description"),
                ("per_page", ITEM_SEARCH_PAGE),
            ])
            .send()
            .await?;
        let response = Self::check(response).await?;

        let parsed: SearchResponse<ItemDocument> = response.json().await?;
        Ok(parsed.hits.into_iter().map(|hit| hit.document).collect())
    }

    /// Geo-filter shops from `shop_ids` within `radius_km` of the caller,
    /// sorted by distance ascending.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on transport failure or backend rejection.
    pub async fn shops_near(
        &self,
        shop_ids: &[String],
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<ShopDocument>, SearchError> {
        let filter_by = nearby_filter(shop_ids, latitude, longitude, radius_km);
        let sort_by = distance_sort(latitude, longitude);

        let response = self
            .inner
            .http
            .get(self.url(&format!("/collections/{SHOPS_COLLECTION}/documents/search")))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .query(&[
                ("q", "*"),
                ("filter_by", filter_by.as_str()),
                ("sort_by", sort_by.as_str()),
                ("per_page", SHOP_SEARCH_PAGE),
            ])
            .send()
            .await?;
        let response = Self::check(response).await?;

        let parsed: SearchResponse<ShopDocument> = response.json().await?;
        Ok(parsed.hits.into_iter().map(|hit| hit.document).collect())
    }
}

/// `filter_by` expression for the nearby-shops query.
fn nearby_filter(shop_ids: &[String], latitude: f64, longitude: f64, radius_km: f64) -> String {
    format!(
        "shop_id:[{}] && location:({latitude}, {longitude}, {radius_km} km)",
        shop_ids.join(",")
    )
}

/// `sort_by` expression ordering shops by distance from the caller.
fn distance_sort(latitude: f64, longitude: f64) -> String {
    format!("location({latitude}, {longitude}):asc")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_filter_expression() {
        let ids = vec!["a1".to_owned(), "b2".to_owned()];
        assert_eq!(
            nearby_filter(&ids, 28.6, 77.2, 5.0),
            "shop_id:[a1,b2] && location:(28.6, 77.2, 5 km)"
        );
    }

    #[test]
    fn test_distance_sort_expression() {
        assert_eq!(distance_sort(28.6, 77.2), "location(28.6, 77.2):asc");
    }

    #[test]
    fn test_search_response_tolerates_missing_hits() {
        let parsed: SearchResponse<ItemDocument> =
            serde_json::from_str("{\"found\": 0}").expect("parse");
        assert!(parsed.hits.is_empty());
    }
}
