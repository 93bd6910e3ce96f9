use std::{collections::BTreeMap, time::SystemTime};

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{CustomListEntity, GameRecord, UserEntity},
        storage::{StorageError, constraints},
        store::StoreRead,
    },
    dto::user::{RegisterUserRequest, UpdateUserRequest},
    error::ServiceError,
    services::list_service::require_default_list,
    state::SharedState,
};

/// User together with counts derived from the edge table at read time.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: UserEntity,
    pub followers: usize,
    pub following: usize,
    /// Games of the default list, in the order they were added.
    pub reviewed_games: Vec<GameRecord>,
}

/// Activity summary of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStatistics {
    /// Ratings plus reviews written by the user.
    pub total_games_logged: usize,
    /// Score to number of ratings with that score.
    pub rating_distribution: BTreeMap<u8, usize>,
}

/// Create a user and its default list in one transaction.
pub async fn register_user(
    state: &SharedState,
    request: RegisterUserRequest,
) -> Result<UserEntity, ServiceError> {
    let username = request.username.trim().to_owned();
    let email = request.email.trim().to_lowercase();
    if username.is_empty() || email.is_empty() {
        return Err(ServiceError::InvalidInput(
            "username and email must not be empty".into(),
        ));
    }

    let now = SystemTime::now();
    let user = UserEntity {
        id: Uuid::new_v4(),
        username,
        email,
        bio: request.bio.filter(|bio| !bio.trim().is_empty()),
        avatar_url: request.avatar_url.filter(|url| !url.trim().is_empty()),
        created_at: now,
        updated_at: now,
    };
    let default_list = CustomListEntity {
        id: Uuid::new_v4(),
        user_id: user.id,
        name: state.config().default_list_name.clone(),
        is_default: true,
        games: Default::default(),
        created_at: now,
    };

    let mut tx = state.store().begin().await?;
    tx.insert_user(user.clone())
        .await
        .map_err(|err| duplicate_user(err, &user))?;
    tx.insert_list(default_list).await?;
    tx.commit().await?;

    info!(user_id = %user.id, username = %user.username, "registered user");
    Ok(user)
}

/// Apply the fields present in `patch` to the user. Blank bio or avatar
/// values clear the stored field.
pub async fn update_user(
    state: &SharedState,
    user_id: Uuid,
    patch: UpdateUserRequest,
) -> Result<UserEntity, ServiceError> {
    let mut tx = state.store().begin().await?;
    let mut user = require_user(tx.as_mut(), user_id).await?;

    if let Some(username) = patch.username {
        let username = username.trim();
        if username.is_empty() {
            return Err(ServiceError::InvalidInput("username must not be empty".into()));
        }
        user.username = username.to_owned();
    }
    if let Some(email) = patch.email {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ServiceError::InvalidInput("email must not be empty".into()));
        }
        user.email = email;
    }
    if let Some(bio) = patch.bio {
        user.bio = Some(bio).filter(|bio| !bio.trim().is_empty());
    }
    if let Some(avatar_url) = patch.avatar_url {
        user.avatar_url = Some(avatar_url).filter(|url| !url.trim().is_empty());
    }
    user.updated_at = SystemTime::now();

    tx.update_user(user.clone())
        .await
        .map_err(|err| duplicate_user(err, &user))?;
    tx.commit().await?;

    info!(%user_id, username = %user.username, "updated user");
    Ok(user)
}

fn duplicate_user(err: StorageError, user: &UserEntity) -> ServiceError {
    if err.is_conflict_on(constraints::USER_USERNAME) {
        ServiceError::AlreadyExists(format!("username `{}` is taken", user.username))
    } else if err.is_conflict_on(constraints::USER_EMAIL) {
        ServiceError::AlreadyExists(format!("email `{}` is already registered", user.email))
    } else {
        err.into()
    }
}

pub async fn get_user(state: &SharedState, user_id: Uuid) -> Result<UserEntity, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_user(view.as_mut(), user_id).await
}

/// Load a user with follower counts and default-list games.
pub async fn get_profile(state: &SharedState, user_id: Uuid) -> Result<UserProfile, ServiceError> {
    let mut view = state.store().snapshot().await?;
    let user = require_user(view.as_mut(), user_id).await?;
    let followers = view.count_followers(user_id).await?;
    let following = view.count_following(user_id).await?;

    let default_list = require_default_list(view.as_mut(), user_id).await?;
    let mut reviewed_games = Vec::with_capacity(default_list.games.len());
    for game_id in &default_list.games {
        if let Some(game) = view.find_game(*game_id).await? {
            reviewed_games.push(game);
        }
    }

    Ok(UserProfile {
        user,
        followers,
        following,
        reviewed_games,
    })
}

pub async fn get_statistics(
    state: &SharedState,
    user_id: Uuid,
) -> Result<UserStatistics, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_user(view.as_mut(), user_id).await?;
    let ratings = view.ratings_for_user(user_id).await?;
    let reviews = view.reviews_for_user(user_id).await?;

    let mut rating_distribution = BTreeMap::new();
    for rating in &ratings {
        *rating_distribution.entry(rating.score).or_insert(0) += 1;
    }

    Ok(UserStatistics {
        total_games_logged: ratings.len() + reviews.len(),
        rating_distribution,
    })
}

/// Fetch a user through `tx`, failing with [`ServiceError::NotFound`].
pub(crate) async fn require_user<R: StoreRead + ?Sized>(
    tx: &mut R,
    user_id: Uuid,
) -> Result<UserEntity, ServiceError> {
    tx.find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user `{user_id}` not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::store::StoreTx,
        services::{
            rating_service, review_service,
            testing::{Harness, register},
        },
    };

    fn patch() -> UpdateUserRequest {
        UpdateUserRequest {
            username: None,
            email: None,
            bio: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn registration_creates_exactly_one_default_list() {
        let harness = Harness::new();
        let alice = register(&harness.state, "alice").await;

        let mut view = harness.state.store().snapshot().await.unwrap();
        let lists = view.lists_for_user(alice.id).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert!(lists[0].is_default);
        assert_eq!(lists[0].name, "Reviewed Games");
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let harness = Harness::new();
        register(&harness.state, "alice").await;

        let same_name = RegisterUserRequest {
            username: "alice".into(),
            email: "other@example.com".into(),
            bio: None,
            avatar_url: None,
        };
        assert!(matches!(
            register_user(&harness.state, same_name).await,
            Err(ServiceError::AlreadyExists(_))
        ));

        let same_email = RegisterUserRequest {
            username: "alice2".into(),
            email: "ALICE@example.com".into(),
            bio: None,
            avatar_url: None,
        };
        assert!(matches!(
            register_user(&harness.state, same_email).await,
            Err(ServiceError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn profile_counts_edges_and_lists_reviewed_games() {
        let harness = Harness::with_games(&[(10, "Hades")]);
        let alice = register(&harness.state, "alice").await;
        let bob = register(&harness.state, "bob").await;
        let game = harness.resolve(10).await;

        crate::services::follow_service::follow(&harness.state, bob.id, alice.id)
            .await
            .unwrap();
        rating_service::submit_rating(&harness.state, game.id, alice.id, 5)
            .await
            .unwrap();

        let profile = get_profile(&harness.state, alice.id).await.unwrap();
        assert_eq!(profile.followers, 1);
        assert_eq!(profile.following, 0);
        assert_eq!(profile.reviewed_games.len(), 1);
        assert_eq!(profile.reviewed_games[0].title, "Hades");
    }

    #[tokio::test]
    async fn statistics_sum_ratings_and_reviews() {
        let harness = Harness::with_games(&[(1, "Celeste"), (2, "Inside")]);
        let alice = register(&harness.state, "alice").await;
        let celeste = harness.resolve(1).await;
        let inside = harness.resolve(2).await;

        rating_service::submit_rating(&harness.state, celeste.id, alice.id, 5)
            .await
            .unwrap();
        rating_service::submit_rating(&harness.state, inside.id, alice.id, 5)
            .await
            .unwrap();
        review_service::submit_review(&harness.state, inside.id, alice.id, "Moody.".into())
            .await
            .unwrap();

        let stats = get_statistics(&harness.state, alice.id).await.unwrap();
        assert_eq!(stats.total_games_logged, 3);
        assert_eq!(stats.rating_distribution, BTreeMap::from([(5, 2)]));
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let harness = Harness::new();
        let alice = register(&harness.state, "alice").await;

        let updated = update_user(
            &harness.state,
            alice.id,
            UpdateUserRequest {
                email: Some(" Alice@Games.example ".into()),
                bio: Some("Speedrunner".into()),
                ..patch()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.email, "alice@games.example");
        assert_eq!(updated.bio.as_deref(), Some("Speedrunner"));
        assert!(updated.updated_at >= alice.updated_at);

        let cleared = update_user(
            &harness.state,
            alice.id,
            UpdateUserRequest {
                bio: Some("  ".into()),
                ..patch()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.bio, None);
        assert_eq!(get_user(&harness.state, alice.id).await.unwrap(), cleared);
    }

    #[tokio::test]
    async fn update_to_taken_username_or_email_is_rejected() {
        let harness = Harness::new();
        let alice = register(&harness.state, "alice").await;
        register(&harness.state, "bob").await;

        assert!(matches!(
            update_user(
                &harness.state,
                alice.id,
                UpdateUserRequest {
                    username: Some("bob".into()),
                    ..patch()
                },
            )
            .await,
            Err(ServiceError::AlreadyExists(_))
        ));
        assert!(matches!(
            update_user(
                &harness.state,
                alice.id,
                UpdateUserRequest {
                    email: Some("BOB@example.com".into()),
                    ..patch()
                },
            )
            .await,
            Err(ServiceError::AlreadyExists(_))
        ));
        assert_eq!(get_user(&harness.state, alice.id).await.unwrap(), alice);

        // Re-submitting your own username is not a conflict.
        update_user(
            &harness.state,
            alice.id,
            UpdateUserRequest {
                username: Some("alice".into()),
                ..patch()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn update_of_unknown_user_is_not_found() {
        let harness = Harness::new();
        assert!(matches!(
            update_user(&harness.state, Uuid::new_v4(), patch()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn profile_without_default_list_is_reported() {
        let harness = Harness::new();
        let now = SystemTime::now();
        let orphan = UserEntity {
            id: Uuid::new_v4(),
            username: "orphan".into(),
            email: "orphan@example.com".into(),
            bio: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        let mut tx = harness.state.store().begin().await.unwrap();
        tx.insert_user(orphan.clone()).await.unwrap();
        tx.commit().await.unwrap();

        let err = get_profile(&harness.state, orphan.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::DefaultListMissing(id) if id == orphan.id));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let harness = Harness::new();
        assert!(matches!(
            get_profile(&harness.state, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
