use std::time::SystemTime;

use tracing::debug;
use uuid::Uuid;

use crate::{
    dao::{
        models::{GameLogEntity, PlayStatus},
        store::StoreRead,
    },
    error::ServiceError,
    services::{catalog_service::require_game, user_service::require_user},
    state::SharedState,
};

/// Set the user's play status for a game, replacing any previous one.
pub async fn log_game(
    state: &SharedState,
    game_id: Uuid,
    user_id: Uuid,
    status: PlayStatus,
) -> Result<GameLogEntity, ServiceError> {
    let mut tx = state.store().begin().await?;
    require_user(tx.as_mut(), user_id).await?;
    require_game(tx.as_mut(), game_id).await?;

    let now = SystemTime::now();
    let log = match tx.find_game_log(user_id, game_id).await? {
        Some(existing) => GameLogEntity {
            status,
            updated_at: now,
            ..existing
        },
        None => GameLogEntity {
            id: Uuid::new_v4(),
            user_id,
            game_id,
            status,
            created_at: now,
            updated_at: now,
        },
    };
    tx.save_game_log(log.clone()).await?;
    tx.commit().await?;

    debug!(%game_id, %user_id, ?status, "game logged");
    Ok(log)
}

/// Current play status, [`PlayStatus::NotLogged`] when nothing was recorded.
pub async fn logged_status(
    state: &SharedState,
    game_id: Uuid,
    user_id: Uuid,
) -> Result<PlayStatus, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_user(view.as_mut(), user_id).await?;
    require_game(view.as_mut(), game_id).await?;
    Ok(view
        .find_game_log(user_id, game_id)
        .await?
        .map(|log| log.status)
        .unwrap_or(PlayStatus::NotLogged))
}
