use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::list::{CreateListRequest, ListMembershipRequest, ListResponse},
    error::AppError,
    routes::extract::ActingUser,
    services::list_service,
    state::SharedState,
};

/// Routes for custom lists and their members.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/lists", post(create_list))
        .route("/lists/{id}", get(get_list).delete(delete_list))
        .route("/lists/{id}/games", post(add_game))
        .route("/lists/{id}/games/{game_id}", delete(remove_game))
}

/// Create a list owned by the caller.
#[utoipa::path(
    post,
    path = "/lists",
    tag = "lists",
    params(("x-user-id" = Uuid, Header, description = "Acting user")),
    request_body = CreateListRequest,
    responses(
        (status = 201, description = "List created", body = ListResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_list(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Valid(Json(payload)): Valid<Json<CreateListRequest>>,
) -> Result<(StatusCode, Json<ListResponse>), AppError> {
    let list = list_service::create_list(&state, user_id, payload.name).await?;
    Ok((StatusCode::CREATED, Json(list.into())))
}

#[utoipa::path(
    get,
    path = "/lists/{id}",
    tag = "lists",
    params(("id" = Uuid, Path, description = "List id")),
    responses(
        (status = 200, description = "List", body = ListResponse),
        (status = 404, description = "List not found")
    )
)]
pub async fn get_list(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListResponse>, AppError> {
    let list = list_service::get_list(&state, id).await?;
    Ok(Json(list.into()))
}

#[utoipa::path(
    delete,
    path = "/lists/{id}",
    tag = "lists",
    params(
        ("id" = Uuid, Path, description = "List id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    responses(
        (status = 204, description = "List deleted"),
        (status = 403, description = "List belongs to another user"),
        (status = 409, description = "Default list")
    )
)]
pub async fn delete_list(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    list_service::delete_list(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a game to one of the caller's lists.
#[utoipa::path(
    post,
    path = "/lists/{id}/games",
    tag = "lists",
    params(
        ("id" = Uuid, Path, description = "List id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    request_body = ListMembershipRequest,
    responses(
        (status = 200, description = "Updated list", body = ListResponse),
        (status = 403, description = "List belongs to another user"),
        (status = 404, description = "List or game not found")
    )
)]
pub async fn add_game(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ListMembershipRequest>>,
) -> Result<Json<ListResponse>, AppError> {
    let list = list_service::add_game_to_list(&state, user_id, id, payload.game_id).await?;
    Ok(Json(list.into()))
}

#[utoipa::path(
    delete,
    path = "/lists/{id}/games/{game_id}",
    tag = "lists",
    params(
        ("id" = Uuid, Path, description = "List id"),
        ("game_id" = Uuid, Path, description = "Member game id"),
        ("x-user-id" = Uuid, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Updated list", body = ListResponse),
        (status = 403, description = "List belongs to another user"),
        (status = 404, description = "List not found or game not a member")
    )
)]
pub async fn remove_game(
    State(state): State<SharedState>,
    ActingUser(user_id): ActingUser,
    Path((id, game_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ListResponse>, AppError> {
    let list = list_service::remove_game_from_list(&state, user_id, id, game_id).await?;
    Ok(Json(list.into()))
}
