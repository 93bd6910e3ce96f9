use std::time::SystemTime;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    dao::{
        models::CustomListEntity,
        store::{StoreRead, StoreTx},
    },
    error::ServiceError,
    services::{catalog_service::require_game, user_service::require_user},
    state::SharedState,
};

const MAX_LIST_NAME_LEN: usize = 100;

/// Add `game_id` to the user's default list unless it is already there.
///
/// Runs inside the caller's transaction. Membership is never removed when
/// the rating or review that triggered it goes away.
pub(crate) async fn ensure_in_reviewed_list(
    tx: &mut dyn StoreTx,
    user_id: Uuid,
    game_id: Uuid,
) -> Result<(), ServiceError> {
    let mut list = require_default_list(&mut *tx, user_id).await?;
    if list.games.insert(game_id) {
        debug!(%user_id, %game_id, list_id = %list.id, "added game to default list");
        tx.update_list(list).await?;
    }
    Ok(())
}

/// Fetch the default list of `user_id`. Its absence breaks the registration
/// invariant, so it is logged at `error!`.
pub(crate) async fn require_default_list<R: StoreRead + ?Sized>(
    tx: &mut R,
    user_id: Uuid,
) -> Result<CustomListEntity, ServiceError> {
    tx.default_list_for(user_id).await?.ok_or_else(|| {
        error!(%user_id, "user has no default list");
        ServiceError::DefaultListMissing(user_id)
    })
}

/// Create a non-default list owned by `user_id`.
pub async fn create_list(
    state: &SharedState,
    user_id: Uuid,
    name: String,
) -> Result<CustomListEntity, ServiceError> {
    let name = validate_name(name)?;
    let mut tx = state.store().begin().await?;
    require_user(tx.as_mut(), user_id).await?;

    let list = CustomListEntity {
        id: Uuid::new_v4(),
        user_id,
        name,
        is_default: false,
        games: Default::default(),
        created_at: SystemTime::now(),
    };
    tx.insert_list(list.clone()).await?;
    tx.commit().await?;

    info!(%user_id, list_id = %list.id, "created custom list");
    Ok(list)
}

pub async fn get_list(state: &SharedState, list_id: Uuid) -> Result<CustomListEntity, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_list(view.as_mut(), list_id).await
}

/// Every list of the user, default list first.
pub async fn lists_for_user(
    state: &SharedState,
    user_id: Uuid,
) -> Result<Vec<CustomListEntity>, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_user(view.as_mut(), user_id).await?;
    Ok(view.lists_for_user(user_id).await?)
}

/// Add a game to one of the user's lists. Adding a member again is a no-op.
pub async fn add_game_to_list(
    state: &SharedState,
    user_id: Uuid,
    list_id: Uuid,
    game_id: Uuid,
) -> Result<CustomListEntity, ServiceError> {
    let mut tx = state.store().begin().await?;
    let mut list = require_owned_list(tx.as_mut(), user_id, list_id).await?;
    require_game(tx.as_mut(), game_id).await?;

    if list.games.insert(game_id) {
        tx.update_list(list.clone()).await?;
        tx.commit().await?;
        debug!(%list_id, %game_id, "added game to list");
    }
    Ok(list)
}

pub async fn remove_game_from_list(
    state: &SharedState,
    user_id: Uuid,
    list_id: Uuid,
    game_id: Uuid,
) -> Result<CustomListEntity, ServiceError> {
    let mut tx = state.store().begin().await?;
    let mut list = require_owned_list(tx.as_mut(), user_id, list_id).await?;

    if !list.games.shift_remove(&game_id) {
        return Err(ServiceError::NotFound(format!(
            "game `{game_id}` is not in list `{list_id}`"
        )));
    }
    tx.update_list(list.clone()).await?;
    tx.commit().await?;

    debug!(%list_id, %game_id, "removed game from list");
    Ok(list)
}

/// Delete a custom list. The default list cannot be deleted.
pub async fn delete_list(
    state: &SharedState,
    user_id: Uuid,
    list_id: Uuid,
) -> Result<(), ServiceError> {
    let mut tx = state.store().begin().await?;
    let list = require_owned_list(tx.as_mut(), user_id, list_id).await?;
    if list.is_default {
        return Err(ServiceError::InvalidState(
            "the default list cannot be deleted".into(),
        ));
    }

    tx.delete_list(list_id).await?;
    tx.commit().await?;

    info!(%user_id, %list_id, "deleted custom list");
    Ok(())
}

fn validate_name(name: String) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("list name must not be empty".into()));
    }
    if name.chars().count() > MAX_LIST_NAME_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "list name must be at most {MAX_LIST_NAME_LEN} characters"
        )));
    }
    Ok(name.to_owned())
}

async fn require_list<R: StoreRead + ?Sized>(
    tx: &mut R,
    list_id: Uuid,
) -> Result<CustomListEntity, ServiceError> {
    tx.find_list(list_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("list `{list_id}` not found")))
}

async fn require_owned_list<R: StoreRead + ?Sized>(
    tx: &mut R,
    user_id: Uuid,
    list_id: Uuid,
) -> Result<CustomListEntity, ServiceError> {
    let list = require_list(tx, list_id).await?;
    if list.user_id != user_id {
        return Err(ServiceError::Forbidden(format!(
            "list `{list_id}` belongs to another user"
        )));
    }
    Ok(list)
}
