//! Reconciliation of external catalog games into local [`GameRecord`]s.

use std::time::SystemTime;

use time::{Date, macros::format_description};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    catalog::models::{ExternalGame, GameSearch, GameSearchPage},
    dao::{
        models::{GameRecord, ReviewEntity},
        storage::{StorageError, constraints},
        store::StoreRead,
    },
    error::ServiceError,
    state::SharedState,
};

/// Stored in place of a description the catalog did not provide.
pub const MISSING_DESCRIPTION: &str = "Description not available";

/// Game record with the reviews currently attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDetails {
    pub game: GameRecord,
    pub reviews: Vec<ReviewEntity>,
}

/// Return the local record for `external_id`, importing it from the
/// catalog on first access.
///
/// Concurrent first accesses race on the `games.external_id` constraint;
/// the loser re-reads the winner's record.
pub async fn resolve_game(state: &SharedState, external_id: i64) -> Result<GameRecord, ServiceError> {
    if let Some(game) = find_by_external_id(state, external_id).await? {
        debug!(external_id, game_id = %game.id, "game already mirrored locally");
        return Ok(game);
    }

    let record = build_record(external_id, fetch_external(state, external_id).await?);
    match insert_record(state, record).await {
        Ok(game) => {
            info!(external_id, game_id = %game.id, "imported game from catalog");
            Ok(game)
        }
        Err(err) if err.is_conflict_on(constraints::GAME_EXTERNAL_ID) => {
            debug!(external_id, "lost import race; reading winner");
            find_by_external_id(state, external_id)
                .await?
                .ok_or(ServiceError::Storage(err))
        }
        Err(err) => Err(err.into()),
    }
}

/// Import `external_id` explicitly. Fails when a local record already exists.
pub async fn create_game(state: &SharedState, external_id: i64) -> Result<GameRecord, ServiceError> {
    if find_by_external_id(state, external_id).await?.is_some() {
        return Err(already_exists(external_id));
    }

    let record = build_record(external_id, fetch_external(state, external_id).await?);
    match insert_record(state, record).await {
        Ok(game) => {
            info!(external_id, game_id = %game.id, "created game from catalog");
            Ok(game)
        }
        Err(err) if err.is_conflict_on(constraints::GAME_EXTERNAL_ID) => {
            Err(already_exists(external_id))
        }
        Err(err) => Err(err.into()),
    }
}

/// Forward a search to the catalog. Results are neither stored nor cached.
pub async fn search_games(
    state: &SharedState,
    search: GameSearch,
) -> Result<GameSearchPage, ServiceError> {
    state.catalog().search_games(search).await.map_err(|err| {
        warn!(error = %err, "catalog search failed");
        ServiceError::from(err)
    })
}

/// Re-fetch the catalog entry behind `game_id` and overwrite the mirrored
/// fields. The external id and rating aggregates are left as stored.
pub async fn refresh_game(state: &SharedState, game_id: Uuid) -> Result<GameRecord, ServiceError> {
    let external_id = {
        let mut view = state.store().snapshot().await?;
        require_game(view.as_mut(), game_id).await?.external_id
    };
    let external = fetch_external(state, external_id).await?;

    let mut tx = state.store().begin().await?;
    let mut game = require_game(tx.as_mut(), game_id).await?;
    game.title = external.name;
    game.description = description_or_sentinel(external.description_raw);
    game.release_date = external.released.as_deref().and_then(parse_release_date);
    game.cover_image = external.background_image.filter(|url| !url.is_empty());
    game.updated_at = SystemTime::now();
    tx.update_game(game.clone()).await?;
    tx.commit().await?;

    info!(external_id, %game_id, "refreshed game from catalog");
    Ok(game)
}

pub async fn get_game(state: &SharedState, game_id: Uuid) -> Result<GameRecord, ServiceError> {
    let mut view = state.store().snapshot().await?;
    require_game(view.as_mut(), game_id).await
}

pub async fn game_details(state: &SharedState, game_id: Uuid) -> Result<GameDetails, ServiceError> {
    let mut view = state.store().snapshot().await?;
    let game = require_game(view.as_mut(), game_id).await?;
    let reviews = view.reviews_for_game(game_id).await?;
    Ok(GameDetails { game, reviews })
}

pub async fn list_games(state: &SharedState) -> Result<Vec<GameRecord>, ServiceError> {
    let mut view = state.store().snapshot().await?;
    Ok(view.list_games().await?)
}

/// Delete a local record nobody references any more.
pub async fn delete_game(state: &SharedState, game_id: Uuid) -> Result<(), ServiceError> {
    let mut tx = state.store().begin().await?;
    require_game(tx.as_mut(), game_id).await?;

    let referenced = !tx.ratings_for_game(game_id).await?.is_empty()
        || !tx.reviews_for_game(game_id).await?.is_empty()
        || tx.count_lists_containing(game_id).await? > 0
        || tx.count_game_logs_for_game(game_id).await? > 0;
    if referenced {
        return Err(ServiceError::InvalidState(format!(
            "game `{game_id}` is still referenced by ratings, reviews, lists or logs"
        )));
    }

    tx.delete_game(game_id).await?;
    tx.commit().await?;
    info!(%game_id, "deleted game");
    Ok(())
}

/// Fetch a game through `tx`, failing with [`ServiceError::NotFound`].
pub(crate) async fn require_game<R: StoreRead + ?Sized>(
    tx: &mut R,
    game_id: Uuid,
) -> Result<GameRecord, ServiceError> {
    tx.find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` not found")))
}

async fn find_by_external_id(
    state: &SharedState,
    external_id: i64,
) -> Result<Option<GameRecord>, ServiceError> {
    let mut view = state.store().snapshot().await?;
    Ok(view.find_game_by_external_id(external_id).await?)
}

async fn fetch_external(state: &SharedState, external_id: i64) -> Result<ExternalGame, ServiceError> {
    state
        .catalog()
        .fetch_game(external_id)
        .await
        .map_err(|err| {
            if err.is_not_found() {
                ServiceError::NotFound(format!("game `{external_id}` does not exist in the catalog"))
            } else {
                warn!(external_id, error = %err, "catalog lookup failed");
                err.into()
            }
        })
}

async fn insert_record(state: &SharedState, record: GameRecord) -> Result<GameRecord, StorageError> {
    let mut tx = state.store().begin().await?;
    tx.insert_game(record.clone()).await?;
    tx.commit().await?;
    Ok(record)
}

fn already_exists(external_id: i64) -> ServiceError {
    ServiceError::AlreadyExists(format!("game `{external_id}` already exists"))
}

/// The record is keyed by the id that was asked for, whatever id the
/// catalog echoes back.
fn build_record(external_id: i64, external: ExternalGame) -> GameRecord {
    if external.id != external_id {
        warn!(external_id, returned_id = external.id, "catalog answered with another id");
    }
    let now = SystemTime::now();

    GameRecord {
        id: Uuid::new_v4(),
        external_id,
        title: external.name,
        description: description_or_sentinel(external.description_raw),
        release_date: external.released.as_deref().and_then(parse_release_date),
        cover_image: external.background_image.filter(|url| !url.is_empty()),
        created_at: now,
        updated_at: now,
        average_rating: 0.0,
        total_ratings: 0,
    }
}

fn description_or_sentinel(raw: Option<String>) -> String {
    raw.filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| MISSING_DESCRIPTION.to_owned())
}

fn parse_release_date(raw: &str) -> Option<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()
}
