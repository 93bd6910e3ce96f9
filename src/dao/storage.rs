use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Integrity failure reported by a store write.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write would violate one of the store's unique constraints.
    #[error("unique constraint `{constraint}` violated")]
    Conflict { constraint: &'static str },
    /// A write referenced a row that does not exist in the transaction.
    #[error("{entity} `{id}` does not exist")]
    MissingRow { entity: &'static str, id: String },
}

impl StorageError {
    /// Whether the error reports a violation of the named unique constraint.
    pub fn is_conflict_on(&self, name: &str) -> bool {
        matches!(self, StorageError::Conflict { constraint } if *constraint == name)
    }
}

/// Names of the unique constraints enforced by every store.
pub mod constraints {
    pub const PRIMARY_KEY: &str = "primary_key";
    pub const GAME_EXTERNAL_ID: &str = "games.external_id";
    pub const RATING_USER_GAME: &str = "ratings.user_id_game_id";
    pub const REVIEW_USER_GAME: &str = "reviews.user_id_game_id";
    pub const FOLLOW_PAIR: &str = "follows.follower_id_following_id";
    pub const USER_USERNAME: &str = "users.username";
    pub const USER_EMAIL: &str = "users.email";
    pub const DEFAULT_LIST_PER_USER: &str = "custom_lists.user_id_default";
    pub const GAME_LOG_USER_GAME: &str = "game_logs.user_id_game_id";
}
