/// Game reconciliation against the external catalog.
pub mod catalog_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Directed follower graph.
pub mod follow_service;
/// Per-user play status of games.
pub mod game_log_service;
/// Health check service.
pub mod health_service;
/// Default-list maintenance and custom list management.
pub mod list_service;
/// Ratings and game rating aggregates.
pub mod rating_service;
/// Cache-aside access to reference collections.
pub mod reference_service;
/// Game reviews.
pub mod review_service;
/// Registration, profiles and statistics.
pub mod user_service;

#[cfg(test)]
pub(crate) mod testing;
