/// Persistence-facing entity definitions.
pub mod models;
/// Storage error taxonomy shared by every backend.
pub mod storage;
/// Transactional store abstraction and its backends.
pub mod store;
