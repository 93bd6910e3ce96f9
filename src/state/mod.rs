use std::sync::Arc;

use crate::{
    catalog::{CatalogApi, cache::ReferenceCache},
    config::AppConfig,
    dao::store::CatalogStore,
};

pub type SharedState = Arc<AppState>;

/// Central application state holding the store, the catalog client and the
/// reference cache.
pub struct AppState {
    store: Arc<dyn CatalogStore>,
    catalog: Arc<dyn CatalogApi>,
    reference_cache: ReferenceCache,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        store: Arc<dyn CatalogStore>,
        catalog: Arc<dyn CatalogApi>,
        config: AppConfig,
    ) -> SharedState {
        let cache = config.reference_cache;
        Arc::new(Self {
            store,
            catalog,
            reference_cache: ReferenceCache::new(cache.ttl, cache.capacity),
            config: Arc::new(config),
        })
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogApi {
        self.catalog.as_ref()
    }

    /// Shared cache for genres, platforms and developers.
    pub fn reference_cache(&self) -> &ReferenceCache {
        &self.reference_cache
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
