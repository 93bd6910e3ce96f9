use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    catalog::models::{ExternalGame, GameSearch, GameSearchPage},
    dao::models::{GameLogEntity, GameRecord, PlayStatus},
    dto::{format_date, format_system_time, review::ReviewResponse},
    services::catalog_service::GameDetails,
};

/// Payload importing a catalog game explicitly.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    #[validate(range(min = 1))]
    pub external_id: i64,
}

/// Query of the catalog search route.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct GameSearchQuery {
    /// Free-text search; omitted lists the catalog unfiltered.
    #[serde(default)]
    #[validate(length(max = 200))]
    pub search: Option<String>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 40))]
    pub page_size: u32,
}

pub(crate) fn default_page() -> u32 {
    1
}

pub(crate) fn default_page_size() -> u32 {
    20
}

impl From<GameSearchQuery> for GameSearch {
    fn from(query: GameSearchQuery) -> Self {
        Self {
            query: query.search,
            page: query.page,
            page_size: query.page_size,
        }
    }
}

/// Local game record.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameResponse {
    pub id: Uuid,
    pub external_id: i64,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`.
    pub release_date: Option<String>,
    pub cover_image: Option<String>,
    pub average_rating: f64,
    pub total_ratings: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameRecord> for GameResponse {
    fn from(game: GameRecord) -> Self {
        Self {
            id: game.id,
            external_id: game.external_id,
            title: game.title,
            description: game.description,
            release_date: game.release_date.map(format_date),
            cover_image: game.cover_image,
            average_rating: game.average_rating,
            total_ratings: game.total_ratings,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
        }
    }
}

/// Game record with its current reviews.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameDetailsResponse {
    #[serde(flatten)]
    pub game: GameResponse,
    pub reviews: Vec<ReviewResponse>,
}

impl From<GameDetails> for GameDetailsResponse {
    fn from(details: GameDetails) -> Self {
        Self {
            game: details.game.into(),
            reviews: details.reviews.into_iter().map(Into::into).collect(),
        }
    }
}

/// Catalog search hit. Not stored locally.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExternalGameSummary {
    pub external_id: i64,
    pub name: String,
    pub released: Option<String>,
    pub background_image: Option<String>,
    pub rating: Option<f64>,
    pub platforms: Vec<String>,
    pub genres: Vec<String>,
}

impl From<ExternalGame> for ExternalGameSummary {
    fn from(game: ExternalGame) -> Self {
        let platforms = game.platform_names();
        Self {
            external_id: game.id,
            name: game.name,
            released: game.released,
            background_image: game.background_image,
            rating: game.rating,
            platforms,
            genres: game.genres.into_iter().map(|g| g.name).collect(),
        }
    }
}

/// One page of catalog search hits.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSearchResponse {
    pub count: u64,
    pub results: Vec<ExternalGameSummary>,
}

impl From<GameSearchPage> for GameSearchResponse {
    fn from(page: GameSearchPage) -> Self {
        Self {
            count: page.count,
            results: page.results.into_iter().map(Into::into).collect(),
        }
    }
}

/// Wire form of [`PlayStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayStatusDto {
    Played,
    Playing,
    WantToPlay,
    NotLogged,
}

impl From<PlayStatusDto> for PlayStatus {
    fn from(status: PlayStatusDto) -> Self {
        match status {
            PlayStatusDto::Played => PlayStatus::Played,
            PlayStatusDto::Playing => PlayStatus::Playing,
            PlayStatusDto::WantToPlay => PlayStatus::WantToPlay,
            PlayStatusDto::NotLogged => PlayStatus::NotLogged,
        }
    }
}

impl From<PlayStatus> for PlayStatusDto {
    fn from(status: PlayStatus) -> Self {
        match status {
            PlayStatus::Played => PlayStatusDto::Played,
            PlayStatus::Playing => PlayStatusDto::Playing,
            PlayStatus::WantToPlay => PlayStatusDto::WantToPlay,
            PlayStatus::NotLogged => PlayStatusDto::NotLogged,
        }
    }
}

/// Payload setting the caller's play status for a game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LogGameRequest {
    pub status: PlayStatusDto,
}

/// Play status of a game for one user.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameLogResponse {
    pub game_id: Uuid,
    pub user_id: Uuid,
    pub status: PlayStatusDto,
}

impl From<GameLogEntity> for GameLogResponse {
    fn from(log: GameLogEntity) -> Self {
        Self {
            game_id: log.game_id,
            user_id: log.user_id,
            status: log.status.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use time::macros::date;

    use super::*;

    #[test]
    fn release_date_is_rendered_as_iso_day() {
        let now = SystemTime::now();
        let response = GameResponse::from(GameRecord {
            id: Uuid::nil(),
            external_id: 1,
            title: "Portal".into(),
            description: "Puzzles".into(),
            release_date: Some(date!(2007 - 10 - 10)),
            cover_image: None,
            created_at: now,
            updated_at: now,
            average_rating: 0.0,
            total_ratings: 0,
        });
        assert_eq!(response.release_date.as_deref(), Some("2007-10-10"));
    }

    #[test]
    fn search_query_defaults_and_bounds() {
        let query: GameSearchQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((query.page, query.page_size), (1, 20));
        assert!(query.validate().is_ok());

        let query: GameSearchQuery = serde_json::from_str(r#"{"page_size": 500}"#).unwrap();
        assert!(query.validate().is_err());
    }

    #[test]
    fn play_status_uses_snake_case() {
        let request: LogGameRequest =
            serde_json::from_str(r#"{"status": "want_to_play"}"#).unwrap();
        assert_eq!(PlayStatus::from(request.status), PlayStatus::WantToPlay);
    }
}
