use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        follow::FollowResponse,
        list::ListResponse,
        rating::RatingResponse,
        review::ReviewResponse,
        user::{
            ProfileResponse, RegisterUserRequest, StatisticsResponse, UpdateUserRequest,
            UserResponse,
        },
    },
    error::AppError,
    routes::extract::ActingUser,
    services::{follow_service, list_service, rating_service, review_service, user_service},
    state::SharedState,
};

/// Routes for accounts, their activity and the follower graph.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/{id}", get(get_user).patch(update_user))
        .route("/users/{id}/profile", get(get_profile))
        .route("/users/{id}/statistics", get(get_statistics))
        .route("/users/{id}/ratings", get(user_ratings))
        .route("/users/{id}/reviews", get(user_reviews))
        .route("/users/{id}/lists", get(user_lists))
        .route("/users/{id}/followers", get(followers))
        .route("/users/{id}/following", get(following))
        .route("/users/{id}/follow", post(follow).delete(unfollow))
}

/// Register a user together with its default list.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 409, description = "Username or email taken")
    )
)]
pub async fn register_user(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RegisterUserRequest>>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = user_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service::get_user(&state, id).await?;
    Ok(Json(user.into()))
}

/// Update the caller's own account.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    request_body = UpdateUserRequest,
    params(
        ("id" = Uuid, Path, description = "User id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Not the caller's account"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email taken")
    )
)]
pub async fn update_user(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateUserRequest>>,
) -> Result<Json<UserResponse>, AppError> {
    if user_id != id {
        return Err(AppError::Forbidden(format!(
            "user `{user_id}` cannot edit account `{id}`"
        )));
    }
    let user = user_service::update_user(&state, id, payload).await?;
    Ok(Json(user.into()))
}

/// User with follower counts and reviewed games.
#[utoipa::path(
    get,
    path = "/users/{id}/profile",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = user_service::get_profile(&state, id).await?;
    Ok(Json(profile.into()))
}

#[utoipa::path(
    get,
    path = "/users/{id}/statistics",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Activity statistics", body = StatisticsResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_statistics(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let stats = user_service::get_statistics(&state, id).await?;
    Ok(Json(stats.into()))
}

#[utoipa::path(
    get,
    path = "/users/{id}/ratings",
    tag = "ratings",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "Ratings by the user", body = [RatingResponse]))
)]
pub async fn user_ratings(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RatingResponse>>, AppError> {
    let ratings = rating_service::ratings_for_user(&state, id).await?;
    Ok(Json(ratings.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}/reviews",
    tag = "reviews",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "Reviews by the user", body = [ReviewResponse]))
)]
pub async fn user_reviews(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let reviews = review_service::reviews_for_user(&state, id).await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

/// Lists of the user, default list first.
#[utoipa::path(
    get,
    path = "/users/{id}/lists",
    tag = "lists",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "Lists of the user", body = [ListResponse]))
)]
pub async fn user_lists(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ListResponse>>, AppError> {
    let lists = list_service::lists_for_user(&state, id).await?;
    Ok(Json(lists.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}/followers",
    tag = "follows",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Users following this user", body = [UserResponse]),
        (status = 404, description = "User not found")
    )
)]
pub async fn followers(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = follow_service::list_followers(&state, id).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}/following",
    tag = "follows",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Users this user follows", body = [UserResponse]),
        (status = 404, description = "User not found")
    )
)]
pub async fn following(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = follow_service::list_following(&state, id).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Make the caller follow user `id`.
#[utoipa::path(
    post,
    path = "/users/{id}/follow",
    tag = "follows",
    params(
        ("id" = Uuid, Path, description = "User to follow"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    responses(
        (status = 201, description = "Now following", body = FollowResponse),
        (status = 400, description = "Self follow"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Already following")
    )
)]
pub async fn follow(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<FollowResponse>), AppError> {
    let edge = follow_service::follow(&state, user_id, id).await?;
    Ok((StatusCode::CREATED, Json(edge.into())))
}

/// Make the caller stop following user `id`.
#[utoipa::path(
    delete,
    path = "/users/{id}/follow",
    tag = "follows",
    params(
        ("id" = Uuid, Path, description = "User to unfollow"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    responses(
        (status = 204, description = "No longer following"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Not following")
    )
)]
pub async fn unfollow(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    follow_service::unfollow(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
