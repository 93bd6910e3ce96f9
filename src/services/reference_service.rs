use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    catalog::{
        cache::CacheKey,
        models::{ReferenceCategory, ReferencePage},
    },
    error::ServiceError,
    state::SharedState,
};

/// Page of genres, platforms or developers, served from the reference cache
/// when a fresh copy exists and fetched from the catalog otherwise.
pub async fn reference_collection(
    state: &SharedState,
    category: ReferenceCategory,
    page: u32,
    page_size: u32,
) -> Result<Arc<ReferencePage>, ServiceError> {
    let key = CacheKey {
        category,
        page,
        page_size,
    };
    if let Some(cached) = state.reference_cache().get(&key) {
        debug!(%category, page, page_size, "reference cache hit");
        return Ok(cached);
    }

    let fetched = state
        .catalog()
        .fetch_reference(category, page, page_size)
        .await
        .map_err(|err| {
            warn!(%category, page, error = %err, "reference fetch failed");
            ServiceError::from(err)
        })?;
    debug!(%category, page, page_size, "reference cache populated");
    Ok(state.reference_cache().insert(key, fetched))
}
