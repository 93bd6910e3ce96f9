use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{
        models::{GameRecord, RatingEntity},
        storage::constraints,
        store::{StoreRead, StoreTx},
    },
    error::ServiceError,
    services::{
        catalog_service::require_game, list_service::ensure_in_reviewed_list,
        user_service::require_user,
    },
    state::SharedState,
};

const MIN_SCORE: i32 = 1;
const MAX_SCORE: i32 = 5;

/// Record `score` for (user, game), replacing any previous score, and
/// refresh the game's aggregate in the same transaction.
pub async fn submit_rating(
    state: &SharedState,
    game_id: Uuid,
    user_id: Uuid,
    score: i32,
) -> Result<RatingEntity, ServiceError> {
    let score = validate_score(score)?;

    // A concurrent first rating for the same pair surfaces as a unique
    // violation; the second pass then finds the row and updates it.
    match upsert_rating(state, game_id, user_id, score).await {
        Err(ServiceError::Storage(err)) if err.is_conflict_on(constraints::RATING_USER_GAME) => {
            debug!(%game_id, %user_id, "rating insert raced; retrying as update");
            upsert_rating(state, game_id, user_id, score).await
        }
        other => other,
    }
}

async fn upsert_rating(
    state: &SharedState,
    game_id: Uuid,
    user_id: Uuid,
    score: u8,
) -> Result<RatingEntity, ServiceError> {
    let mut tx = state.store().begin().await?;
    require_user(tx.as_mut(), user_id).await?;
    let game = require_game(tx.as_mut(), game_id).await?;

    let now = SystemTime::now();
    let rating = match tx.find_rating_for(user_id, game_id).await? {
        Some(mut existing) => {
            existing.score = score;
            existing.updated_at = now;
            tx.update_rating(existing.clone()).await?;
            existing
        }
        None => {
            let rating = RatingEntity {
                id: Uuid::new_v4(),
                user_id,
                game_id,
                score,
                created_at: now,
                updated_at: now,
            };
            tx.insert_rating(rating.clone()).await?;
            rating
        }
    };

    let game = recompute_aggregate(tx.as_mut(), game).await?;
    ensure_in_reviewed_list(tx.as_mut(), user_id, game_id).await?;
    tx.commit().await?;

    info!(
        %game_id,
        %user_id,
        score,
        average = game.average_rating,
        total = game.total_ratings,
        "rating recorded"
    );
    Ok(rating)
}

/// Delete the caller's own rating and refresh the aggregate. List membership
/// stays untouched.
pub async fn delete_rating(
    state: &SharedState,
    rating_id: Uuid,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let mut tx = state.store().begin().await?;
    let rating = tx
        .find_rating(rating_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("rating `{rating_id}` not found")))?;
    if rating.user_id != user_id {
        return Err(ServiceError::Forbidden(format!(
            "rating `{rating_id}` belongs to another user"
        )));
    }

    let game = require_game(tx.as_mut(), rating.game_id).await?;
    tx.delete_rating(rating_id).await?;
    recompute_aggregate(tx.as_mut(), game).await?;
    tx.commit().await?;

    info!(%rating_id, game_id = %rating.game_id, "rating deleted");
    Ok(())
}

pub async fn get_rating(state: &SharedState, rating_id: Uuid) -> Result<RatingEntity, ServiceError> {
    let mut view = state.store().snapshot().await?;
    view.find_rating(rating_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("rating `{rating_id}` not found")))
}

pub async fn ratings_for_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<Vec<RatingEntity>, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_game(view.as_mut(), game_id).await?;
    Ok(view.ratings_for_game(game_id).await?)
}

pub async fn ratings_for_user(
    state: &SharedState,
    user_id: Uuid,
) -> Result<Vec<RatingEntity>, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_user(view.as_mut(), user_id).await?;
    Ok(view.ratings_for_user(user_id).await?)
}

/// Re-derive `average_rating` and `total_ratings` from every current rating
/// of the game and store them.
pub(crate) async fn recompute_aggregate(
    tx: &mut dyn StoreTx,
    mut game: GameRecord,
) -> Result<GameRecord, ServiceError> {
    let ratings = tx.ratings_for_game(game.id).await?;
    let (average_rating, total_ratings) = aggregate(&ratings);

    game.average_rating = average_rating;
    game.total_ratings = total_ratings;
    game.updated_at = SystemTime::now();
    tx.update_game(game.clone()).await?;
    Ok(game)
}

fn aggregate(ratings: &[RatingEntity]) -> (f64, u32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let sum: u64 = ratings.iter().map(|r| u64::from(r.score)).sum();
    (sum as f64 / ratings.len() as f64, ratings.len() as u32)
}

fn validate_score(score: i32) -> Result<u8, ServiceError> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(score as u8)
    } else {
        Err(ServiceError::InvalidScore(score))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::Rng;

    use super::*;
    use crate::{
        dao::storage::constraints,
        services::{
            catalog_service::get_game,
            list_service::lists_for_user,
            review_service,
            testing::{FaultyStore, Harness, register},
        },
    };

    #[tokio::test]
    async fn resubmission_updates_in_place() {
        let harness = Harness::with_games(&[(1, "Doom")]);
        let u1 = register(&harness.state, "u1").await;
        let g1 = harness.resolve(1).await;

        let first = submit_rating(&harness.state, g1.id, u1.id, 4).await.unwrap();
        let second = submit_rating(&harness.state, g1.id, u1.id, 2).await.unwrap();

        assert_eq!(first.id, second.id);
        let ratings = ratings_for_game(&harness.state, g1.id).await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].score, 2);

        let game = get_game(&harness.state, g1.id).await.unwrap();
        assert_eq!(game.average_rating, 2.0);
        assert_eq!(game.total_ratings, 1);
    }

    #[tokio::test]
    async fn aggregate_matches_mean_after_every_submission() {
        let harness = Harness::with_games(&[(1, "Doom")]);
        let game = harness.resolve(1).await;
        let mut users = Vec::new();
        for i in 0..5 {
            users.push(register(&harness.state, &format!("user{i}")).await);
        }

        let mut model: HashMap<Uuid, u8> = HashMap::new();
        for _ in 0..60 {
            let (user, score) = {
                let mut rng = rand::rng();
                (&users[rng.random_range(0..users.len())], rng.random_range(1..=5))
            };
            submit_rating(&harness.state, game.id, user.id, score)
                .await
                .unwrap();
            model.insert(user.id, score as u8);

            let stored = get_game(&harness.state, game.id).await.unwrap();
            let sum: u64 = model.values().map(|s| u64::from(*s)).sum();
            assert_eq!(stored.total_ratings as usize, model.len());
            assert_eq!(stored.average_rating, sum as f64 / model.len() as f64);
        }
    }

    #[tokio::test]
    async fn concurrent_submissions_lose_no_update() {
        let harness = Harness::with_games(&[(1, "Doom")]);
        let game = harness.resolve(1).await;
        let alice = register(&harness.state, "alice").await;
        let bob = register(&harness.state, "bob").await;

        let (a, b) = tokio::join!(
            submit_rating(&harness.state, game.id, alice.id, 5),
            submit_rating(&harness.state, game.id, bob.id, 2)
        );
        a.unwrap();
        b.unwrap();

        let stored = get_game(&harness.state, game.id).await.unwrap();
        assert_eq!(stored.total_ratings, 2);
        assert_eq!(stored.average_rating, 3.5);
    }

    #[tokio::test]
    async fn scores_outside_range_are_rejected() {
        let harness = Harness::with_games(&[(1, "Doom")]);
        let alice = register(&harness.state, "alice").await;
        let game = harness.resolve(1).await;

        for score in [0, 6, -1] {
            assert!(matches!(
                submit_rating(&harness.state, game.id, alice.id, score).await,
                Err(ServiceError::InvalidScore(s)) if s == score
            ));
        }
        assert!(ratings_for_game(&harness.state, game.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_user_or_game_is_not_found() {
        let harness = Harness::with_games(&[(1, "Doom")]);
        let alice = register(&harness.state, "alice").await;
        let game = harness.resolve(1).await;

        assert!(matches!(
            submit_rating(&harness.state, Uuid::new_v4(), alice.id, 3).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            submit_rating(&harness.state, game.id, Uuid::new_v4(), 3).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rating_and_review_add_to_default_list_once() {
        let harness = Harness::with_games(&[(1, "Doom")]);
        let alice = register(&harness.state, "alice").await;
        let game = harness.resolve(1).await;

        let rating = submit_rating(&harness.state, game.id, alice.id, 4).await.unwrap();
        review_service::submit_review(&harness.state, game.id, alice.id, "Rip and tear.".into())
            .await
            .unwrap();

        let default_list = &lists_for_user(&harness.state, alice.id).await.unwrap()[0];
        assert_eq!(default_list.games.iter().copied().collect::<Vec<_>>(), vec![game.id]);

        delete_rating(&harness.state, rating.id, alice.id).await.unwrap();
        let default_list = &lists_for_user(&harness.state, alice.id).await.unwrap()[0];
        assert!(default_list.games.contains(&game.id));
    }

    #[tokio::test]
    async fn deletion_is_owner_only_and_recomputes() {
        let harness = Harness::with_games(&[(1, "Doom")]);
        let alice = register(&harness.state, "alice").await;
        let bob = register(&harness.state, "bob").await;
        let game = harness.resolve(1).await;

        let rating = submit_rating(&harness.state, game.id, alice.id, 5).await.unwrap();
        submit_rating(&harness.state, game.id, bob.id, 1).await.unwrap();

        assert!(matches!(
            delete_rating(&harness.state, rating.id, bob.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        delete_rating(&harness.state, rating.id, alice.id).await.unwrap();

        let stored = get_game(&harness.state, game.id).await.unwrap();
        assert_eq!(stored.total_ratings, 1);
        assert_eq!(stored.average_rating, 1.0);
        assert!(matches!(
            get_rating(&harness.state, rating.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn pair_conflict_on_first_insert_is_retried_once() {
        let store = FaultyStore::new();
        let harness = Harness::with_store(store.clone(), &[(1, "Doom")]);
        let alice = register(&harness.state, "alice").await;
        let game = harness.resolve(1).await;

        store.conflict_on_next_insert(constraints::RATING_USER_GAME);
        let begins = store.begins();
        let rating = submit_rating(&harness.state, game.id, alice.id, 4).await.unwrap();

        assert_eq!(store.begins() - begins, 2);
        let ratings = ratings_for_game(&harness.state, game.id).await.unwrap();
        assert_eq!(ratings, vec![rating]);
        let stored = get_game(&harness.state, game.id).await.unwrap();
        assert_eq!(stored.total_ratings, 1);
        assert_eq!(stored.average_rating, 4.0);
    }

    #[tokio::test]
    async fn repeated_pair_conflict_is_not_retried_again() {
        let store = FaultyStore::new();
        let harness = Harness::with_store(store.clone(), &[(1, "Doom")]);
        let alice = register(&harness.state, "alice").await;
        let game = harness.resolve(1).await;

        store.conflict_on_next_insert(constraints::RATING_USER_GAME);
        store.conflict_on_next_insert(constraints::RATING_USER_GAME);
        let begins = store.begins();
        let err = submit_rating(&harness.state, game.id, alice.id, 4)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Storage(ref e) if e.is_conflict_on(constraints::RATING_USER_GAME)));
        assert_eq!(store.begins() - begins, 2);
        assert!(ratings_for_game(&harness.state, game.id).await.unwrap().is_empty());
    }

    #[test]
    fn empty_rating_set_aggregates_to_zero() {
        assert_eq!(aggregate(&[]), (0.0, 0));
    }
}
