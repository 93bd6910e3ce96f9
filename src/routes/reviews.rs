use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::put,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::review::{ReviewResponse, SubmitReviewRequest},
    error::AppError,
    routes::extract::ActingUser,
    services::review_service,
    state::SharedState,
};

/// Routes addressing a review by its id.
pub fn router() -> Router<SharedState> {
    Router::new().route("/reviews/{id}", put(update_review).delete(delete_review))
}

/// Replace the text of the caller's review.
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = "reviews",
    params(
        ("id" = Uuid, Path, description = "Review id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    request_body = SubmitReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 403, description = "Review belongs to another user"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn update_review(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SubmitReviewRequest>>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review = review_service::update_review(&state, id, user_id, payload.text).await?;
    Ok(Json(review.into()))
}

#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "reviews",
    params(
        ("id" = Uuid, Path, description = "Review id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Review belongs to another user"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    review_service::delete_review(&state, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
