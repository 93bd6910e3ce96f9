use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::rating::RatingResponse, error::AppError, routes::extract::ActingUser,
    services::rating_service, state::SharedState,
};

/// Routes addressing a rating by its id.
pub fn router() -> Router<SharedState> {
    Router::new().route("/ratings/{id}", get(get_rating).delete(delete_rating))
}

#[utoipa::path(
    get,
    path = "/ratings/{id}",
    tag = "ratings",
    params(("id" = Uuid, Path, description = "Rating id")),
    responses(
        (status = 200, description = "Rating", body = RatingResponse),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn get_rating(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RatingResponse>, AppError> {
    let rating = rating_service::get_rating(&state, id).await?;
    Ok(Json(rating.into()))
}

/// Delete the caller's rating; the game aggregate is recomputed.
#[utoipa::path(
    delete,
    path = "/ratings/{id}",
    tag = "ratings",
    params(
        ("id" = Uuid, Path, description = "Rating id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    responses(
        (status = 204, description = "Rating deleted"),
        (status = 403, description = "Rating belongs to another user"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn delete_rating(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    rating_service::delete_rating(&state, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
