use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use futures::{FutureExt, future::BoxFuture};
use uuid::Uuid;

use crate::{
    catalog::fake::FakeCatalog,
    config::AppConfig,
    dao::{
        models::{
            CustomListEntity, FollowEdgeEntity, GameLogEntity, GameRecord, RatingEntity,
            ReviewEntity, UserEntity,
        },
        storage::{StorageError, StorageResult, constraints},
        store::{CatalogStore, StoreRead, StoreTx, TxFuture, memory::InMemoryStore},
    },
    dto::user::RegisterUserRequest,
    services::{catalog_service, user_service},
    state::{AppState, SharedState},
};

/// State backed by an in-memory store and a scriptable catalog.
pub struct Harness {
    pub state: SharedState,
    pub catalog: Arc<FakeCatalog>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_catalog(FakeCatalog::new())
    }

    pub fn with_games(games: &[(i64, &str)]) -> Self {
        let catalog = games
            .iter()
            .fold(FakeCatalog::new(), |catalog, (id, name)| catalog.with_game(*id, name));
        Self::with_catalog(catalog)
    }

    pub fn with_catalog(catalog: FakeCatalog) -> Self {
        Self::build(Arc::new(InMemoryStore::new()), catalog)
    }

    pub fn with_store(store: Arc<dyn CatalogStore>, games: &[(i64, &str)]) -> Self {
        let catalog = games
            .iter()
            .fold(FakeCatalog::new(), |catalog, (id, name)| catalog.with_game(*id, name));
        Self::build(store, catalog)
    }

    fn build(store: Arc<dyn CatalogStore>, catalog: FakeCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let state = AppState::new(store, catalog.clone(), AppConfig::default());
        Self { state, catalog }
    }

    pub async fn resolve(&self, external_id: i64) -> GameRecord {
        catalog_service::resolve_game(&self.state, external_id)
            .await
            .unwrap()
    }
}

pub async fn register(state: &SharedState, username: &str) -> UserEntity {
    user_service::register_user(
        state,
        RegisterUserRequest {
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            bio: None,
            avatar_url: None,
        },
    )
    .await
    .unwrap()
}

/// In-memory store whose transactions can be told to reject the next
/// rating or review insert with a unique violation, the way a concurrent
/// writer winning the race would.
#[derive(Default)]
pub struct FaultyStore {
    inner: InMemoryStore,
    conflicts: Arc<Mutex<Vec<&'static str>>>,
    begins: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue one `Conflict { constraint }` for the next matching insert.
    pub fn conflict_on_next_insert(&self, constraint: &'static str) {
        self.conflicts.lock().unwrap().push(constraint);
    }

    /// Number of write transactions opened so far.
    pub fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }
}

impl CatalogStore for FaultyStore {
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn StoreTx>>> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        let conflicts = self.conflicts.clone();
        let begin = self.inner.begin();
        async move {
            let inner = begin.await?;
            Ok(Box::new(FaultyTx { inner, conflicts }) as Box<dyn StoreTx>)
        }
        .boxed()
    }

    fn snapshot(&self) -> BoxFuture<'static, StorageResult<Box<dyn StoreRead>>> {
        self.inner.snapshot()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }
}

struct FaultyTx {
    inner: Box<dyn StoreTx>,
    conflicts: Arc<Mutex<Vec<&'static str>>>,
}

impl FaultyTx {
    fn take_conflict(&self, constraint: &'static str) -> Option<StorageError> {
        let mut queued = self.conflicts.lock().unwrap();
        let position = queued.iter().position(|c| *c == constraint)?;
        queued.remove(position);
        Some(StorageError::Conflict { constraint })
    }
}

macro_rules! forward {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $out:ty;)*) => {
        $(fn $name(&mut self, $($arg: $ty),*) -> TxFuture<'_, $out> {
            self.inner.$name($($arg),*)
        })*
    };
}

impl StoreRead for FaultyTx {
    forward! {
        find_user(id: Uuid) -> Option<UserEntity>;
        find_game(id: Uuid) -> Option<GameRecord>;
        find_game_by_external_id(external_id: i64) -> Option<GameRecord>;
        list_games() -> Vec<GameRecord>;
        find_rating(id: Uuid) -> Option<RatingEntity>;
        find_rating_for(user_id: Uuid, game_id: Uuid) -> Option<RatingEntity>;
        ratings_for_game(game_id: Uuid) -> Vec<RatingEntity>;
        ratings_for_user(user_id: Uuid) -> Vec<RatingEntity>;
        find_review(id: Uuid) -> Option<ReviewEntity>;
        find_review_for(user_id: Uuid, game_id: Uuid) -> Option<ReviewEntity>;
        reviews_for_game(game_id: Uuid) -> Vec<ReviewEntity>;
        reviews_for_user(user_id: Uuid) -> Vec<ReviewEntity>;
        find_list(id: Uuid) -> Option<CustomListEntity>;
        default_list_for(user_id: Uuid) -> Option<CustomListEntity>;
        lists_for_user(user_id: Uuid) -> Vec<CustomListEntity>;
        count_lists_containing(game_id: Uuid) -> usize;
        find_follow(follower_id: Uuid, following_id: Uuid) -> Option<FollowEdgeEntity>;
        followers_of(user_id: Uuid) -> Vec<FollowEdgeEntity>;
        following_of(user_id: Uuid) -> Vec<FollowEdgeEntity>;
        count_followers(user_id: Uuid) -> usize;
        count_following(user_id: Uuid) -> usize;
        find_game_log(user_id: Uuid, game_id: Uuid) -> Option<GameLogEntity>;
        count_game_logs_for_game(game_id: Uuid) -> usize;
    }
}

impl StoreTx for FaultyTx {
    forward! {
        insert_user(user: UserEntity) -> ();
        update_user(user: UserEntity) -> ();
        insert_game(game: GameRecord) -> ();
        update_game(game: GameRecord) -> ();
        delete_game(id: Uuid) -> bool;
        update_rating(rating: RatingEntity) -> ();
        delete_rating(id: Uuid) -> bool;
        update_review(review: ReviewEntity) -> ();
        delete_review(id: Uuid) -> bool;
        insert_list(list: CustomListEntity) -> ();
        update_list(list: CustomListEntity) -> ();
        delete_list(id: Uuid) -> bool;
        insert_follow(edge: FollowEdgeEntity) -> ();
        delete_follow(follower_id: Uuid, following_id: Uuid) -> bool;
        save_game_log(log: GameLogEntity) -> ();
    }

    fn insert_rating(&mut self, rating: RatingEntity) -> TxFuture<'_, ()> {
        match self.take_conflict(constraints::RATING_USER_GAME) {
            Some(err) => async move { Err(err) }.boxed(),
            None => self.inner.insert_rating(rating),
        }
    }

    fn insert_review(&mut self, review: ReviewEntity) -> TxFuture<'_, ()> {
        match self.take_conflict(constraints::REVIEW_USER_GAME) {
            Some(err) => async move { Err(err) }.boxed(),
            None => self.inner.insert_review(review),
        }
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.commit()
    }
}
