use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{FollowEdgeEntity, UserEntity},
        storage::constraints,
        store::StoreRead,
    },
    error::ServiceError,
    services::user_service::require_user,
    state::SharedState,
};

/// Create the edge `follower_id -> following_id`.
pub async fn follow(
    state: &SharedState,
    follower_id: Uuid,
    following_id: Uuid,
) -> Result<FollowEdgeEntity, ServiceError> {
    if follower_id == following_id {
        return Err(ServiceError::SelfFollow);
    }

    let mut tx = state.store().begin().await?;
    require_user(tx.as_mut(), follower_id).await?;
    require_user(tx.as_mut(), following_id).await?;
    if tx.find_follow(follower_id, following_id).await?.is_some() {
        return Err(ServiceError::AlreadyFollowing(following_id));
    }

    let edge = FollowEdgeEntity {
        follower_id,
        following_id,
        created_at: SystemTime::now(),
    };
    tx.insert_follow(edge).await.map_err(|err| {
        if err.is_conflict_on(constraints::FOLLOW_PAIR) {
            ServiceError::AlreadyFollowing(following_id)
        } else {
            err.into()
        }
    })?;
    tx.commit().await?;

    info!(%follower_id, %following_id, "follow edge created");
    Ok(edge)
}

/// Remove the edge `follower_id -> following_id`.
pub async fn unfollow(
    state: &SharedState,
    follower_id: Uuid,
    following_id: Uuid,
) -> Result<(), ServiceError> {
    let mut tx = state.store().begin().await?;
    require_user(tx.as_mut(), follower_id).await?;
    require_user(tx.as_mut(), following_id).await?;
    if !tx.delete_follow(follower_id, following_id).await? {
        return Err(ServiceError::NotFollowing(following_id));
    }
    tx.commit().await?;

    info!(%follower_id, %following_id, "follow edge removed");
    Ok(())
}

/// Users following `user_id`.
pub async fn list_followers(
    state: &SharedState,
    user_id: Uuid,
) -> Result<Vec<UserEntity>, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_user(view.as_mut(), user_id).await?;
    let edges = view.followers_of(user_id).await?;
    load_users(view.as_mut(), edges.iter().map(|e| e.follower_id)).await
}

/// Users `user_id` follows.
pub async fn list_following(
    state: &SharedState,
    user_id: Uuid,
) -> Result<Vec<UserEntity>, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_user(view.as_mut(), user_id).await?;
    let edges = view.following_of(user_id).await?;
    load_users(view.as_mut(), edges.iter().map(|e| e.following_id)).await
}

async fn load_users(
    view: &mut dyn StoreRead,
    ids: impl Iterator<Item = Uuid>,
) -> Result<Vec<UserEntity>, ServiceError> {
    let mut users = Vec::new();
    for id in ids {
        if let Some(user) = view.find_user(id).await? {
            users.push(user);
        }
    }
    Ok(users)
}
