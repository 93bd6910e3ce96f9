pub mod memory;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    CustomListEntity, FollowEdgeEntity, GameLogEntity, GameRecord, RatingEntity, ReviewEntity,
    UserEntity,
};
use crate::dao::storage::StorageResult;

/// Future returned by every store operation.
pub type TxFuture<'a, T> = BoxFuture<'a, StorageResult<T>>;

/// Abstraction over the persistence layer owning users, games and their relations.
pub trait CatalogStore: Send + Sync {
    /// Open a read-write transaction. Every write staged on it is published by
    /// [`StoreTx::commit`] and discarded when the handle is dropped instead.
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn StoreTx>>>;
    /// Open a consistent read-only view. Never waits on open write transactions.
    fn snapshot(&self) -> BoxFuture<'static, StorageResult<Box<dyn StoreRead>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Lookups shared by snapshots and transactions.
pub trait StoreRead: Send {
    fn find_user(&mut self, id: Uuid) -> TxFuture<'_, Option<UserEntity>>;

    fn find_game(&mut self, id: Uuid) -> TxFuture<'_, Option<GameRecord>>;
    fn find_game_by_external_id(&mut self, external_id: i64) -> TxFuture<'_, Option<GameRecord>>;
    fn list_games(&mut self) -> TxFuture<'_, Vec<GameRecord>>;

    fn find_rating(&mut self, id: Uuid) -> TxFuture<'_, Option<RatingEntity>>;
    fn find_rating_for(&mut self, user_id: Uuid, game_id: Uuid)
    -> TxFuture<'_, Option<RatingEntity>>;
    fn ratings_for_game(&mut self, game_id: Uuid) -> TxFuture<'_, Vec<RatingEntity>>;
    fn ratings_for_user(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<RatingEntity>>;

    fn find_review(&mut self, id: Uuid) -> TxFuture<'_, Option<ReviewEntity>>;
    fn find_review_for(&mut self, user_id: Uuid, game_id: Uuid)
    -> TxFuture<'_, Option<ReviewEntity>>;
    fn reviews_for_game(&mut self, game_id: Uuid) -> TxFuture<'_, Vec<ReviewEntity>>;
    fn reviews_for_user(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<ReviewEntity>>;

    fn find_list(&mut self, id: Uuid) -> TxFuture<'_, Option<CustomListEntity>>;
    fn default_list_for(&mut self, user_id: Uuid) -> TxFuture<'_, Option<CustomListEntity>>;
    fn lists_for_user(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<CustomListEntity>>;
    fn count_lists_containing(&mut self, game_id: Uuid) -> TxFuture<'_, usize>;

    fn find_follow(
        &mut self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> TxFuture<'_, Option<FollowEdgeEntity>>;
    /// Edges pointing at `user_id`.
    fn followers_of(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<FollowEdgeEntity>>;
    /// Edges leaving `user_id`.
    fn following_of(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<FollowEdgeEntity>>;
    fn count_followers(&mut self, user_id: Uuid) -> TxFuture<'_, usize>;
    fn count_following(&mut self, user_id: Uuid) -> TxFuture<'_, usize>;

    fn find_game_log(&mut self, user_id: Uuid, game_id: Uuid)
    -> TxFuture<'_, Option<GameLogEntity>>;
    fn count_game_logs_for_game(&mut self, game_id: Uuid) -> TxFuture<'_, usize>;
}

/// Unit of work over the store. Unique constraints from
/// [`constraints`](crate::dao::storage::constraints) are checked on every write.
pub trait StoreTx: StoreRead {
    fn insert_user(&mut self, user: UserEntity) -> TxFuture<'_, ()>;
    fn update_user(&mut self, user: UserEntity) -> TxFuture<'_, ()>;

    fn insert_game(&mut self, game: GameRecord) -> TxFuture<'_, ()>;
    fn update_game(&mut self, game: GameRecord) -> TxFuture<'_, ()>;
    fn delete_game(&mut self, id: Uuid) -> TxFuture<'_, bool>;

    fn insert_rating(&mut self, rating: RatingEntity) -> TxFuture<'_, ()>;
    fn update_rating(&mut self, rating: RatingEntity) -> TxFuture<'_, ()>;
    fn delete_rating(&mut self, id: Uuid) -> TxFuture<'_, bool>;

    fn insert_review(&mut self, review: ReviewEntity) -> TxFuture<'_, ()>;
    fn update_review(&mut self, review: ReviewEntity) -> TxFuture<'_, ()>;
    fn delete_review(&mut self, id: Uuid) -> TxFuture<'_, bool>;

    fn insert_list(&mut self, list: CustomListEntity) -> TxFuture<'_, ()>;
    fn update_list(&mut self, list: CustomListEntity) -> TxFuture<'_, ()>;
    fn delete_list(&mut self, id: Uuid) -> TxFuture<'_, bool>;

    fn insert_follow(&mut self, edge: FollowEdgeEntity) -> TxFuture<'_, ()>;
    fn delete_follow(&mut self, follower_id: Uuid, following_id: Uuid) -> TxFuture<'_, bool>;

    /// Insert or replace the log row with the same id.
    fn save_game_log(&mut self, log: GameLogEntity) -> TxFuture<'_, ()>;

    /// Publish every staged write atomically.
    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>>;
}
