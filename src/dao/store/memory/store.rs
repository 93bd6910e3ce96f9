use std::sync::Arc;

use futures::{
    FutureExt,
    future::{BoxFuture, ready},
};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use super::tables::Tables;
use crate::dao::{
    models::{
        CustomListEntity, FollowEdgeEntity, GameLogEntity, GameRecord, RatingEntity, ReviewEntity,
        UserEntity,
    },
    storage::StorageResult,
    store::{CatalogStore, StoreRead, StoreTx, TxFuture},
};

/// Process-local store.
///
/// Readers work on the last published [`Tables`] and never wait for writers.
/// Write transactions are serialised by `writer`, stage their changes on a
/// copy-on-write clone and publish it on commit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    published: Arc<RwLock<Arc<Tables>>>,
    writer: Arc<Mutex<()>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for InMemoryStore {
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn StoreTx>>> {
        let published = self.published.clone();
        let writer = self.writer.clone();
        Box::pin(async move {
            let guard = writer.lock_owned().await;
            let staged = Tables::clone(&*published.read().await);
            Ok(Box::new(MemoryTx {
                _guard: guard,
                published,
                staged,
            }) as Box<dyn StoreTx>)
        })
    }

    fn snapshot(&self) -> BoxFuture<'static, StorageResult<Box<dyn StoreRead>>> {
        let published = self.published.clone();
        Box::pin(async move {
            let tables = published.read().await.clone();
            Ok(Box::new(Snapshot { tables }) as Box<dyn StoreRead>)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(Ok(())).boxed()
    }
}

/// Read-only view over one published version.
struct Snapshot {
    tables: Arc<Tables>,
}

struct MemoryTx {
    _guard: OwnedMutexGuard<()>,
    published: Arc<RwLock<Arc<Tables>>>,
    staged: Tables,
}

trait TableView: Send {
    fn tables(&self) -> &Tables;

    fn read<T: Send + 'static>(&self, query: impl FnOnce(&Tables) -> T) -> TxFuture<'_, T> {
        ready(Ok(query(self.tables()))).boxed()
    }
}

impl TableView for Snapshot {
    fn tables(&self) -> &Tables {
        &self.tables
    }
}

impl TableView for MemoryTx {
    fn tables(&self) -> &Tables {
        &self.staged
    }
}

impl MemoryTx {
    fn write<T: Send + 'static>(
        &mut self,
        change: impl FnOnce(&mut Tables) -> StorageResult<T>,
    ) -> TxFuture<'_, T> {
        ready(change(&mut self.staged)).boxed()
    }
}

impl<V: TableView> StoreRead for V {
    fn find_user(&mut self, id: Uuid) -> TxFuture<'_, Option<UserEntity>> {
        self.read(|t| t.find_user(id))
    }

    fn find_game(&mut self, id: Uuid) -> TxFuture<'_, Option<GameRecord>> {
        self.read(|t| t.find_game(id))
    }

    fn find_game_by_external_id(&mut self, external_id: i64) -> TxFuture<'_, Option<GameRecord>> {
        self.read(|t| t.find_game_by_external_id(external_id))
    }

    fn list_games(&mut self) -> TxFuture<'_, Vec<GameRecord>> {
        self.read(|t| t.list_games())
    }

    fn find_rating(&mut self, id: Uuid) -> TxFuture<'_, Option<RatingEntity>> {
        self.read(|t| t.find_rating(id))
    }

    fn find_rating_for(
        &mut self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> TxFuture<'_, Option<RatingEntity>> {
        self.read(|t| t.find_rating_for(user_id, game_id))
    }

    fn ratings_for_game(&mut self, game_id: Uuid) -> TxFuture<'_, Vec<RatingEntity>> {
        self.read(|t| t.ratings_where(|r| r.game_id == game_id))
    }

    fn ratings_for_user(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<RatingEntity>> {
        self.read(|t| t.ratings_where(|r| r.user_id == user_id))
    }

    fn find_review(&mut self, id: Uuid) -> TxFuture<'_, Option<ReviewEntity>> {
        self.read(|t| t.find_review(id))
    }

    fn find_review_for(
        &mut self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> TxFuture<'_, Option<ReviewEntity>> {
        self.read(|t| t.find_review_for(user_id, game_id))
    }

    fn reviews_for_game(&mut self, game_id: Uuid) -> TxFuture<'_, Vec<ReviewEntity>> {
        self.read(|t| t.reviews_where(|r| r.game_id == game_id))
    }

    fn reviews_for_user(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<ReviewEntity>> {
        self.read(|t| t.reviews_where(|r| r.user_id == user_id))
    }

    fn find_list(&mut self, id: Uuid) -> TxFuture<'_, Option<CustomListEntity>> {
        self.read(|t| t.find_list(id))
    }

    fn default_list_for(&mut self, user_id: Uuid) -> TxFuture<'_, Option<CustomListEntity>> {
        self.read(|t| t.default_list_for(user_id))
    }

    fn lists_for_user(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<CustomListEntity>> {
        self.read(|t| t.lists_for_user(user_id))
    }

    fn count_lists_containing(&mut self, game_id: Uuid) -> TxFuture<'_, usize> {
        self.read(|t| t.count_lists_containing(game_id))
    }

    fn find_follow(
        &mut self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> TxFuture<'_, Option<FollowEdgeEntity>> {
        self.read(|t| t.find_follow(follower_id, following_id))
    }

    fn followers_of(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<FollowEdgeEntity>> {
        self.read(|t| t.follows_where(|e| e.following_id == user_id))
    }

    fn following_of(&mut self, user_id: Uuid) -> TxFuture<'_, Vec<FollowEdgeEntity>> {
        self.read(|t| t.follows_where(|e| e.follower_id == user_id))
    }

    fn count_followers(&mut self, user_id: Uuid) -> TxFuture<'_, usize> {
        self.read(|t| t.count_follows_where(|e| e.following_id == user_id))
    }

    fn count_following(&mut self, user_id: Uuid) -> TxFuture<'_, usize> {
        self.read(|t| t.count_follows_where(|e| e.follower_id == user_id))
    }

    fn find_game_log(
        &mut self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> TxFuture<'_, Option<GameLogEntity>> {
        self.read(|t| t.find_game_log(user_id, game_id))
    }

    fn count_game_logs_for_game(&mut self, game_id: Uuid) -> TxFuture<'_, usize> {
        self.read(|t| t.count_game_logs_for_game(game_id))
    }
}

impl StoreTx for MemoryTx {
    fn insert_user(&mut self, user: UserEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.insert_user(user))
    }

    fn update_user(&mut self, user: UserEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.update_user(user))
    }

    fn insert_game(&mut self, game: GameRecord) -> TxFuture<'_, ()> {
        self.write(|t| t.insert_game(game))
    }

    fn update_game(&mut self, game: GameRecord) -> TxFuture<'_, ()> {
        self.write(|t| t.update_game(game))
    }

    fn delete_game(&mut self, id: Uuid) -> TxFuture<'_, bool> {
        self.write(|t| Ok(t.delete_game(id)))
    }

    fn insert_rating(&mut self, rating: RatingEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.insert_rating(rating))
    }

    fn update_rating(&mut self, rating: RatingEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.update_rating(rating))
    }

    fn delete_rating(&mut self, id: Uuid) -> TxFuture<'_, bool> {
        self.write(|t| Ok(t.delete_rating(id)))
    }

    fn insert_review(&mut self, review: ReviewEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.insert_review(review))
    }

    fn update_review(&mut self, review: ReviewEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.update_review(review))
    }

    fn delete_review(&mut self, id: Uuid) -> TxFuture<'_, bool> {
        self.write(|t| Ok(t.delete_review(id)))
    }

    fn insert_list(&mut self, list: CustomListEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.insert_list(list))
    }

    fn update_list(&mut self, list: CustomListEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.update_list(list))
    }

    fn delete_list(&mut self, id: Uuid) -> TxFuture<'_, bool> {
        self.write(|t| Ok(t.delete_list(id)))
    }

    fn insert_follow(&mut self, edge: FollowEdgeEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.insert_follow(edge))
    }

    fn delete_follow(&mut self, follower_id: Uuid, following_id: Uuid) -> TxFuture<'_, bool> {
        self.write(|t| Ok(t.delete_follow(follower_id, following_id)))
    }

    fn save_game_log(&mut self, log: GameLogEntity) -> TxFuture<'_, ()> {
        self.write(|t| t.save_game_log(log))
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        let MemoryTx {
            _guard,
            published,
            staged,
        } = *self;
        Box::pin(async move {
            *published.write().await = Arc::new(staged);
            drop(_guard);
            Ok(())
        })
    }
}
