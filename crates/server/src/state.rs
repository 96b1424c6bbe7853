//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::ResponseCache;
use crate::config::ServerConfig;
use crate::db::EntityStore;
use crate::search::{SearchClient, SearchError};

/// Application state shared across all handlers.
///
/// Constructed once at process start and torn down at shutdown; the store,
/// cache, and search client are process-wide dependencies passed by reference
/// into the business logic rather than reached through globals. Cheaply
/// cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: EntityStore,
    cache: ResponseCache,
    search: SearchClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the search client cannot be constructed.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, SearchError> {
        let search = SearchClient::new(&config.search)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                store: EntityStore::new(pool),
                cache: ResponseCache::new(),
                search,
                config,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the entity store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.inner.store
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        self.inner.store.pool()
    }

    /// Get a reference to the response cache.
    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Get a reference to the search-index client.
    #[must_use]
    pub fn search(&self) -> &SearchClient {
        &self.inner.search
    }
}
