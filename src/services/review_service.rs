use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{
        models::ReviewEntity,
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

const MAX_REVIEW_LEN: usize = 10_000;

/// Write the user's review of a game. A second submission replaces the text.
pub async fn submit_review(
    state: &SharedState,
    game_id: Uuid,
    user_id: Uuid,
    text: String,
) -> Result<ReviewEntity, ServiceError> {
    let text = validate_text(text)?;

    match upsert_review(state, game_id, user_id, &text).await {
        Err(ServiceError::Storage(err)) if err.is_conflict_on(constraints::REVIEW_USER_GAME) => {
            debug!(%game_id, %user_id, "review insert raced; retrying as update");
            upsert_review(state, game_id, user_id, &text).await
        }
        other => other,
    }
}

async fn upsert_review(
    state: &SharedState,
    game_id: Uuid,
    user_id: Uuid,
    text: &str,
) -> Result<ReviewEntity, ServiceError> {
    let mut tx = state.store().begin().await?;
    require_user(tx.as_mut(), user_id).await?;
    require_game(tx.as_mut(), game_id).await?;

    let now = SystemTime::now();
    let review = match tx.find_review_for(user_id, game_id).await? {
        Some(mut existing) => {
            existing.text = text.to_owned();
            existing.updated_at = now;
            tx.update_review(existing.clone()).await?;
            existing
        }
        None => {
            let review = ReviewEntity {
                id: Uuid::new_v4(),
                user_id,
                game_id,
                text: text.to_owned(),
                created_at: now,
                updated_at: now,
            };
            tx.insert_review(review.clone()).await?;
            review
        }
    };

    ensure_in_reviewed_list(tx.as_mut(), user_id, game_id).await?;
    tx.commit().await?;

    info!(%game_id, %user_id, review_id = %review.id, "review recorded");
    Ok(review)
}

pub async fn update_review(
    state: &SharedState,
    review_id: Uuid,
    user_id: Uuid,
    text: String,
) -> Result<ReviewEntity, ServiceError> {
    let text = validate_text(text)?;
    let mut tx = state.store().begin().await?;
    let mut review = require_owned_review(tx.as_mut(), review_id, user_id).await?;

    review.text = text;
    review.updated_at = SystemTime::now();
    tx.update_review(review.clone()).await?;
    tx.commit().await?;
    Ok(review)
}

/// Remove the caller's review. The game stays in the default list.
pub async fn delete_review(
    state: &SharedState,
    review_id: Uuid,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let mut tx = state.store().begin().await?;
    require_owned_review(tx.as_mut(), review_id, user_id).await?;
    tx.delete_review(review_id).await?;
    tx.commit().await?;

    info!(%review_id, "review deleted");
    Ok(())
}

pub async fn reviews_for_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<Vec<ReviewEntity>, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_game(view.as_mut(), game_id).await?;
    Ok(view.reviews_for_game(game_id).await?)
}

pub async fn reviews_for_user(
    state: &SharedState,
    user_id: Uuid,
) -> Result<Vec<ReviewEntity>, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_user(view.as_mut(), user_id).await?;
    Ok(view.reviews_for_user(user_id).await?)
}

fn validate_text(text: String) -> Result<String, ServiceError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ServiceError::InvalidInput("review text must not be empty".into()));
    }
    if text.chars().count() > MAX_REVIEW_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "review text must be at most {MAX_REVIEW_LEN} characters"
        )));
    }
    Ok(text.to_owned())
}

async fn require_owned_review<R: StoreRead + ?Sized>(
    tx: &mut R,
    review_id: Uuid,
    user_id: Uuid,
) -> Result<ReviewEntity, ServiceError> {
    let review = tx
        .find_review(review_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("review `{review_id}` not found")))?;
    if review.user_id != user_id {
        return Err(ServiceError::Forbidden(format!(
            "review `{review_id}` belongs to another user"
        )));
    }
    Ok(review)
}
