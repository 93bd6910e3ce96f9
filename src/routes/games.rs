use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        game::{
            CreateGameRequest, GameDetailsResponse, GameLogResponse, GameResponse,
            GameSearchQuery, GameSearchResponse, LogGameRequest, PlayStatusDto,
        },
        rating::{RatingResponse, SubmitRatingRequest},
        review::{ReviewResponse, SubmitReviewRequest},
    },
    error::AppError,
    routes::extract::ActingUser,
    services::{catalog_service, game_log_service, rating_service, review_service},
    state::SharedState,
};

/// Routes for local game records and per-game user activity.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/search", get(search_games))
        .route("/games/external/{external_id}", get(resolve_game))
        .route("/games/{id}", get(game_details).delete(delete_game))
        .route("/games/{id}/refresh", post(refresh_game))
        .route("/games/{id}/rating", put(submit_rating))
        .route("/games/{id}/ratings", get(game_ratings))
        .route("/games/{id}/review", put(submit_review))
        .route("/games/{id}/reviews", get(game_reviews))
        .route("/games/{id}/log", get(logged_status).put(log_game))
}

/// List every game mirrored locally.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    responses((status = 200, description = "Local games", body = [GameResponse]))
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    let games = catalog_service::list_games(&state).await?;
    Ok(Json(games.into_iter().map(Into::into).collect()))
}

/// Import a catalog game explicitly.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game imported", body = GameResponse),
        (status = 404, description = "Unknown catalog id"),
        (status = 409, description = "Game already imported"),
        (status = 503, description = "Catalog temporarily unavailable")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    let game = catalog_service::create_game(&state, payload.external_id).await?;
    Ok((StatusCode::CREATED, Json(game.into())))
}

/// Search the external catalog without importing anything.
#[utoipa::path(
    get,
    path = "/games/search",
    tag = "games",
    params(GameSearchQuery),
    responses(
        (status = 200, description = "Catalog hits", body = GameSearchResponse),
        (status = 503, description = "Catalog temporarily unavailable")
    )
)]
pub async fn search_games(
    State(state): State<SharedState>,
    Valid(Query(query)): Valid<Query<GameSearchQuery>>,
) -> Result<Json<GameSearchResponse>, AppError> {
    let page = catalog_service::search_games(&state, query.into()).await?;
    Ok(Json(page.into()))
}

/// Return the local record for a catalog id, importing it on first access.
#[utoipa::path(
    get,
    path = "/games/external/{external_id}",
    tag = "games",
    params(("external_id" = i64, Path, description = "Catalog identifier")),
    responses(
        (status = 200, description = "Local game record", body = GameResponse),
        (status = 404, description = "Unknown catalog id"),
        (status = 503, description = "Catalog temporarily unavailable")
    )
)]
pub async fn resolve_game(
    State(state): State<SharedState>,
    Path(external_id): Path<i64>,
) -> Result<Json<GameResponse>, AppError> {
    let game = catalog_service::resolve_game(&state, external_id).await?;
    Ok(Json(game.into()))
}

/// Game record with its reviews.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Local game id")),
    responses(
        (status = 200, description = "Game details", body = GameDetailsResponse),
        (status = 404, description = "Game not found")
    )
)]
pub async fn game_details(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameDetailsResponse>, AppError> {
    let details = catalog_service::game_details(&state, id).await?;
    Ok(Json(details.into()))
}

/// Delete a game nothing references.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Local game id")),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Game still referenced")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    catalog_service::delete_game(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pull the latest catalog data into a mirrored game.
#[utoipa::path(
    post,
    path = "/games/{id}/refresh",
    tag = "games",
    params(("id" = Uuid, Path, description = "Local game id")),
    responses(
        (status = 200, description = "Game refreshed", body = GameResponse),
        (status = 404, description = "Game not found locally or in the catalog"),
        (status = 503, description = "Catalog unavailable, try again")
    )
)]
pub async fn refresh_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameResponse>, AppError> {
    let game = catalog_service::refresh_game(&state, id).await?;
    Ok(Json(game.into()))
}

/// Submit or replace the caller's rating.
#[utoipa::path(
    put,
    path = "/games/{id}/rating",
    tag = "ratings",
    params(
        ("id" = Uuid, Path, description = "Local game id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    request_body = SubmitRatingRequest,
    responses(
        (status = 200, description = "Rating stored", body = RatingResponse),
        (status = 400, description = "Score outside 1..=5"),
        (status = 404, description = "User or game not found")
    )
)]
pub async fn submit_rating(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SubmitRatingRequest>>,
) -> Result<Json<RatingResponse>, AppError> {
    let rating = rating_service::submit_rating(&state, id, user_id, payload.score).await?;
    Ok(Json(rating.into()))
}

#[utoipa::path(
    get,
    path = "/games/{id}/ratings",
    tag = "ratings",
    params(("id" = Uuid, Path, description = "Local game id")),
    responses((status = 200, description = "Ratings of the game", body = [RatingResponse]))
)]
pub async fn game_ratings(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RatingResponse>>, AppError> {
    let ratings = rating_service::ratings_for_game(&state, id).await?;
    Ok(Json(ratings.into_iter().map(Into::into).collect()))
}

/// Submit or replace the caller's review.
#[utoipa::path(
    put,
    path = "/games/{id}/review",
    tag = "reviews",
    params(
        ("id" = Uuid, Path, description = "Local game id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    request_body = SubmitReviewRequest,
    responses(
        (status = 200, description = "Review stored", body = ReviewResponse),
        (status = 404, description = "User or game not found")
    )
)]
pub async fn submit_review(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SubmitReviewRequest>>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review = review_service::submit_review(&state, id, user_id, payload.text).await?;
    Ok(Json(review.into()))
}

#[utoipa::path(
    get,
    path = "/games/{id}/reviews",
    tag = "reviews",
    params(("id" = Uuid, Path, description = "Local game id")),
    responses((status = 200, description = "Reviews of the game", body = [ReviewResponse]))
)]
pub async fn game_reviews(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let reviews = review_service::reviews_for_game(&state, id).await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

/// Caller's play status for the game.
#[utoipa::path(
    get,
    path = "/games/{id}/log",
    tag = "games",
    params(
        ("id" = Uuid, Path, description = "Local game id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    responses((status = 200, description = "Play status", body = GameLogResponse))
)]
pub async fn logged_status(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<GameLogResponse>, AppError> {
    let status = game_log_service::logged_status(&state, id, user_id).await?;
    Ok(Json(GameLogResponse {
        game_id: id,
        user_id,
        status: PlayStatusDto::from(status),
    }))
}

#[utoipa::path(
    put,
    path = "/games/{id}/log",
    tag = "games",
    params(
        ("id" = Uuid, Path, description = "Local game id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    request_body = LogGameRequest,
    responses((status = 200, description = "Play status stored", body = GameLogResponse))
)]
pub async fn log_game(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<LogGameRequest>>,
) -> Result<Json<GameLogResponse>, AppError> {
    let log = game_log_service::log_game(&state, id, user_id, payload.status.into()).await?;
    Ok(Json(log.into()))
}
