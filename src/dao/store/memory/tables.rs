use std::{collections::HashMap, sync::Arc};

use uuid::Uuid;

use crate::dao::{
    models::{
        CustomListEntity, FollowEdgeEntity, GameLogEntity, GameRecord, RatingEntity, ReviewEntity,
        UserEntity,
    },
    storage::{StorageError, StorageResult, constraints},
};

/// Every relation held by the in-memory store. Each table sits behind its own
/// [`Arc`]: cloning `Tables` is cheap and a staged write copies only the
/// tables it touches.
#[derive(Debug, Clone, Default)]
pub(super) struct Tables {
    users: Arc<HashMap<Uuid, UserEntity>>,
    games: Arc<HashMap<Uuid, GameRecord>>,
    games_by_external_id: Arc<HashMap<i64, Uuid>>,
    ratings: Arc<HashMap<Uuid, RatingEntity>>,
    reviews: Arc<HashMap<Uuid, ReviewEntity>>,
    lists: Arc<HashMap<Uuid, CustomListEntity>>,
    follows: Arc<HashMap<(Uuid, Uuid), FollowEdgeEntity>>,
    game_logs: Arc<HashMap<Uuid, GameLogEntity>>,
}

fn missing(entity: &'static str, id: impl ToString) -> StorageError {
    StorageError::MissingRow {
        entity,
        id: id.to_string(),
    }
}

fn conflict(constraint: &'static str) -> StorageError {
    StorageError::Conflict { constraint }
}

impl Tables {
    // -- users --------------------------------------------------------------

    pub fn find_user(&self, id: Uuid) -> Option<UserEntity> {
        self.users.get(&id).cloned()
    }

    pub fn insert_user(&mut self, user: UserEntity) -> StorageResult<()> {
        if self.users.contains_key(&user.id) {
            return Err(conflict(constraints::PRIMARY_KEY));
        }
        if self.users.values().any(|u| u.username == user.username) {
            return Err(conflict(constraints::USER_USERNAME));
        }
        if self.users.values().any(|u| u.email == user.email) {
            return Err(conflict(constraints::USER_EMAIL));
        }
        Arc::make_mut(&mut self.users).insert(user.id, user);
        Ok(())
    }

    pub fn update_user(&mut self, user: UserEntity) -> StorageResult<()> {
        if !self.users.contains_key(&user.id) {
            return Err(missing("user", user.id));
        }
        let mut others = self.users.values().filter(|u| u.id != user.id);
        if others.clone().any(|u| u.username == user.username) {
            return Err(conflict(constraints::USER_USERNAME));
        }
        if others.any(|u| u.email == user.email) {
            return Err(conflict(constraints::USER_EMAIL));
        }
        Arc::make_mut(&mut self.users).insert(user.id, user);
        Ok(())
    }

    fn require_user(&self, id: Uuid) -> StorageResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(missing("user", id))
        }
    }

    // -- games --------------------------------------------------------------

    pub fn find_game(&self, id: Uuid) -> Option<GameRecord> {
        self.games.get(&id).cloned()
    }

    pub fn find_game_by_external_id(&self, external_id: i64) -> Option<GameRecord> {
        self.games_by_external_id
            .get(&external_id)
            .and_then(|id| self.games.get(id))
            .cloned()
    }

    pub fn list_games(&self) -> Vec<GameRecord> {
        let mut games = self.games.values().cloned().collect::<Vec<_>>();
        games.sort_by_key(|game| game.created_at);
        games
    }

    pub fn insert_game(&mut self, game: GameRecord) -> StorageResult<()> {
        if self.games.contains_key(&game.id) {
            return Err(conflict(constraints::PRIMARY_KEY));
        }
        if self.games_by_external_id.contains_key(&game.external_id) {
            return Err(conflict(constraints::GAME_EXTERNAL_ID));
        }
        Arc::make_mut(&mut self.games_by_external_id).insert(game.external_id, game.id);
        Arc::make_mut(&mut self.games).insert(game.id, game);
        Ok(())
    }

    pub fn update_game(&mut self, game: GameRecord) -> StorageResult<()> {
        let Some(existing) = Arc::make_mut(&mut self.games).get_mut(&game.id) else {
            return Err(missing("game", game.id));
        };
        // The external identifier is immutable once set.
        if existing.external_id != game.external_id {
            return Err(conflict(constraints::GAME_EXTERNAL_ID));
        }
        *existing = game;
        Ok(())
    }

    pub fn delete_game(&mut self, id: Uuid) -> bool {
        match Arc::make_mut(&mut self.games).remove(&id) {
            Some(game) => {
                Arc::make_mut(&mut self.games_by_external_id).remove(&game.external_id);
                true
            }
            None => false,
        }
    }

    fn require_game(&self, id: Uuid) -> StorageResult<()> {
        if self.games.contains_key(&id) {
            Ok(())
        } else {
            Err(missing("game", id))
        }
    }

    // -- ratings ------------------------------------------------------------

    pub fn find_rating(&self, id: Uuid) -> Option<RatingEntity> {
        self.ratings.get(&id).cloned()
    }

    pub fn find_rating_for(&self, user_id: Uuid, game_id: Uuid) -> Option<RatingEntity> {
        self.ratings
            .values()
            .find(|r| r.user_id == user_id && r.game_id == game_id)
            .cloned()
    }

    pub fn ratings_where(&self, predicate: impl Fn(&RatingEntity) -> bool) -> Vec<RatingEntity> {
        let mut ratings = self
            .ratings
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect::<Vec<_>>();
        ratings.sort_by_key(|r| r.created_at);
        ratings
    }

    pub fn insert_rating(&mut self, rating: RatingEntity) -> StorageResult<()> {
        self.require_user(rating.user_id)?;
        self.require_game(rating.game_id)?;
        if self.ratings.contains_key(&rating.id) {
            return Err(conflict(constraints::PRIMARY_KEY));
        }
        if self.find_rating_for(rating.user_id, rating.game_id).is_some() {
            return Err(conflict(constraints::RATING_USER_GAME));
        }
        Arc::make_mut(&mut self.ratings).insert(rating.id, rating);
        Ok(())
    }

    pub fn update_rating(&mut self, rating: RatingEntity) -> StorageResult<()> {
        match Arc::make_mut(&mut self.ratings).get_mut(&rating.id) {
            Some(existing)
                if existing.user_id == rating.user_id && existing.game_id == rating.game_id =>
            {
                *existing = rating;
                Ok(())
            }
            Some(_) => Err(conflict(constraints::RATING_USER_GAME)),
            None => Err(missing("rating", rating.id)),
        }
    }

    pub fn delete_rating(&mut self, id: Uuid) -> bool {
        Arc::make_mut(&mut self.ratings).remove(&id).is_some()
    }

    // -- reviews ------------------------------------------------------------

    pub fn find_review(&self, id: Uuid) -> Option<ReviewEntity> {
        self.reviews.get(&id).cloned()
    }

    pub fn find_review_for(&self, user_id: Uuid, game_id: Uuid) -> Option<ReviewEntity> {
        self.reviews
            .values()
            .find(|r| r.user_id == user_id && r.game_id == game_id)
            .cloned()
    }

    pub fn reviews_where(&self, predicate: impl Fn(&ReviewEntity) -> bool) -> Vec<ReviewEntity> {
        let mut reviews = self
            .reviews
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect::<Vec<_>>();
        reviews.sort_by_key(|r| r.created_at);
        reviews
    }

    pub fn insert_review(&mut self, review: ReviewEntity) -> StorageResult<()> {
        self.require_user(review.user_id)?;
        self.require_game(review.game_id)?;
        if self.reviews.contains_key(&review.id) {
            return Err(conflict(constraints::PRIMARY_KEY));
        }
        if self.find_review_for(review.user_id, review.game_id).is_some() {
            return Err(conflict(constraints::REVIEW_USER_GAME));
        }
        Arc::make_mut(&mut self.reviews).insert(review.id, review);
        Ok(())
    }

    pub fn update_review(&mut self, review: ReviewEntity) -> StorageResult<()> {
        match Arc::make_mut(&mut self.reviews).get_mut(&review.id) {
            Some(existing)
                if existing.user_id == review.user_id && existing.game_id == review.game_id =>
            {
                *existing = review;
                Ok(())
            }
            Some(_) => Err(conflict(constraints::REVIEW_USER_GAME)),
            None => Err(missing("review", review.id)),
        }
    }

    pub fn delete_review(&mut self, id: Uuid) -> bool {
        Arc::make_mut(&mut self.reviews).remove(&id).is_some()
    }

    // -- custom lists -------------------------------------------------------

    pub fn find_list(&self, id: Uuid) -> Option<CustomListEntity> {
        self.lists.get(&id).cloned()
    }

    pub fn default_list_for(&self, user_id: Uuid) -> Option<CustomListEntity> {
        self.lists
            .values()
            .find(|l| l.user_id == user_id && l.is_default)
            .cloned()
    }

    pub fn lists_for_user(&self, user_id: Uuid) -> Vec<CustomListEntity> {
        let mut lists = self
            .lists
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        // Default list first, then creation order.
        lists.sort_by_key(|l| (!l.is_default, l.created_at));
        lists
    }

    pub fn count_lists_containing(&self, game_id: Uuid) -> usize {
        self.lists
            .values()
            .filter(|l| l.games.contains(&game_id))
            .count()
    }

    pub fn insert_list(&mut self, list: CustomListEntity) -> StorageResult<()> {
        self.require_user(list.user_id)?;
        if self.lists.contains_key(&list.id) {
            return Err(conflict(constraints::PRIMARY_KEY));
        }
        if list.is_default && self.default_list_for(list.user_id).is_some() {
            return Err(conflict(constraints::DEFAULT_LIST_PER_USER));
        }
        Arc::make_mut(&mut self.lists).insert(list.id, list);
        Ok(())
    }

    pub fn update_list(&mut self, list: CustomListEntity) -> StorageResult<()> {
        if let Some(game_id) = list.games.iter().find(|id| !self.games.contains_key(*id)) {
            return Err(missing("game", game_id));
        }
        match Arc::make_mut(&mut self.lists).get_mut(&list.id) {
            Some(existing)
                if existing.user_id == list.user_id && existing.is_default == list.is_default =>
            {
                *existing = list;
                Ok(())
            }
            Some(_) => Err(conflict(constraints::DEFAULT_LIST_PER_USER)),
            None => Err(missing("custom list", list.id)),
        }
    }

    pub fn delete_list(&mut self, id: Uuid) -> bool {
        Arc::make_mut(&mut self.lists).remove(&id).is_some()
    }

    // -- follow edges -------------------------------------------------------

    pub fn find_follow(&self, follower_id: Uuid, following_id: Uuid) -> Option<FollowEdgeEntity> {
        self.follows.get(&(follower_id, following_id)).copied()
    }

    pub fn insert_follow(&mut self, edge: FollowEdgeEntity) -> StorageResult<()> {
        self.require_user(edge.follower_id)?;
        self.require_user(edge.following_id)?;
        let key = (edge.follower_id, edge.following_id);
        if self.follows.contains_key(&key) {
            return Err(conflict(constraints::FOLLOW_PAIR));
        }
        Arc::make_mut(&mut self.follows).insert(key, edge);
        Ok(())
    }

    pub fn delete_follow(&mut self, follower_id: Uuid, following_id: Uuid) -> bool {
        Arc::make_mut(&mut self.follows).remove(&(follower_id, following_id)).is_some()
    }

    pub fn follows_where(
        &self,
        predicate: impl Fn(&FollowEdgeEntity) -> bool,
    ) -> Vec<FollowEdgeEntity> {
        self.follows.values().filter(|e| predicate(e)).copied().collect()
    }

    pub fn count_follows_where(&self, predicate: impl Fn(&FollowEdgeEntity) -> bool) -> usize {
        self.follows.values().filter(|e| predicate(e)).count()
    }

    // -- game logs ----------------------------------------------------------

    pub fn find_game_log(&self, user_id: Uuid, game_id: Uuid) -> Option<GameLogEntity> {
        self.game_logs
            .values()
            .find(|l| l.user_id == user_id && l.game_id == game_id)
            .cloned()
    }

    pub fn save_game_log(&mut self, log: GameLogEntity) -> StorageResult<()> {
        self.require_user(log.user_id)?;
        self.require_game(log.game_id)?;
        if let Some(existing) = self.find_game_log(log.user_id, log.game_id) {
            if existing.id != log.id {
                return Err(conflict(constraints::GAME_LOG_USER_GAME));
            }
        }
        Arc::make_mut(&mut self.game_logs).insert(log.id, log);
        Ok(())
    }

    pub fn count_game_logs_for_game(&self, game_id: Uuid) -> usize {
        self.game_logs
            .values()
            .filter(|l| l.game_id == game_id)
            .count()
    }
}
