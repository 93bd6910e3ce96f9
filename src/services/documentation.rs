use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Gameboxd backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::games::list_games,
        crate::routes::games::create_game,
        crate::routes::games::search_games,
        crate::routes::games::resolve_game,
        crate::routes::games::game_details,
        crate::routes::games::delete_game,
        crate::routes::games::refresh_game,
        crate::routes::games::submit_rating,
        crate::routes::games::game_ratings,
        crate::routes::games::submit_review,
        crate::routes::games::game_reviews,
        crate::routes::games::logged_status,
        crate::routes::games::log_game,
        crate::routes::ratings::get_rating,
        crate::routes::ratings::delete_rating,
        crate::routes::reviews::update_review,
        crate::routes::reviews::delete_review,
        crate::routes::users::register_user,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::get_profile,
        crate::routes::users::get_statistics,
        crate::routes::users::user_ratings,
        crate::routes::users::user_reviews,
        crate::routes::users::user_lists,
        crate::routes::users::followers,
        crate::routes::users::following,
        crate::routes::users::follow,
        crate::routes::users::unfollow,
        crate::routes::lists::create_list,
        crate::routes::lists::get_list,
        crate::routes::lists::delete_list,
        crate::routes::lists::add_game,
        crate::routes::lists::remove_game,
        crate::routes::reference::reference_collection,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::GameResponse,
            crate::dto::game::GameDetailsResponse,
            crate::dto::game::ExternalGameSummary,
            crate::dto::game::GameSearchResponse,
            crate::dto::game::PlayStatusDto,
            crate::dto::game::LogGameRequest,
            crate::dto::game::GameLogResponse,
            crate::dto::rating::SubmitRatingRequest,
            crate::dto::rating::RatingResponse,
            crate::dto::review::SubmitReviewRequest,
            crate::dto::review::ReviewResponse,
            crate::dto::list::CreateListRequest,
            crate::dto::list::ListMembershipRequest,
            crate::dto::list::ListResponse,
            crate::dto::follow::FollowResponse,
            crate::dto::user::RegisterUserRequest,
            crate::dto::user::UpdateUserRequest,
            crate::dto::user::UserResponse,
            crate::dto::user::ProfileResponse,
            crate::dto::user::StatisticsResponse,
            crate::dto::reference::ReferencePageResponse,
            crate::catalog::models::ReferenceItem,
            crate::catalog::models::ReferenceCategory,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Local game records mirrored from the catalog"),
        (name = "ratings", description = "Scores and per-game aggregates"),
        (name = "reviews", description = "Written reviews"),
        (name = "users", description = "Accounts and profiles"),
        (name = "follows", description = "Follower graph"),
        (name = "lists", description = "Custom lists and the default reviewed list"),
        (name = "reference", description = "Cached genres, platforms and developers"),
    )
)]
pub struct ApiDoc;
