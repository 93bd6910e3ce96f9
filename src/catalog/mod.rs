//! Client side of the external game catalog: wire models, failure
//! classification, retry policy, the HTTP client and the reference cache.

pub mod cache;
pub mod error;
pub mod models;
pub mod rawg;
pub mod retry;

#[cfg(test)]
pub mod fake;

use futures::future::BoxFuture;

use self::{
    error::CatalogResult,
    models::{ExternalGame, GameSearch, GameSearchPage, ReferenceCategory, ReferencePage},
};

/// Read-only view of the external catalog used by the reconciler and the
/// reference cache. Implementations carry their own timeout and retry policy.
pub trait CatalogApi: Send + Sync {
    /// `GET /games/{external_id}`.
    fn fetch_game(&self, external_id: i64) -> BoxFuture<'static, CatalogResult<ExternalGame>>;
    /// `GET /games?search=…`.
    fn search_games(&self, search: GameSearch) -> BoxFuture<'static, CatalogResult<GameSearchPage>>;
    /// `GET /{genres|platforms|developers}`.
    fn fetch_reference(
        &self,
        category: ReferenceCategory,
        page: u32,
        page_size: u32,
    ) -> BoxFuture<'static, CatalogResult<ReferencePage>>;
}
