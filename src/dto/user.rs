use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::UserEntity,
    dto::{format_system_time, game::GameResponse, validation::validate_username},
    services::user_service::{UserProfile, UserStatistics},
};

/// Payload registering a new account.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// Partial update of an account. Absent fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// Public view of a user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl From<UserEntity> for UserResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            username: user.username,
            bio: user.bio,
            avatar_url: user.avatar_url,
            created_at: format_system_time(user.created_at),
        }
    }
}

/// User with follower counts and the games of the default list.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub followers_count: usize,
    pub following_count: usize,
    pub reviewed_games: Vec<GameResponse>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user: profile.user.into(),
            followers_count: profile.followers,
            following_count: profile.following,
            reviewed_games: profile.reviewed_games.into_iter().map(Into::into).collect(),
        }
    }
}

/// Rating and review activity of a user.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsResponse {
    /// Ratings plus reviews.
    pub total_games_logged: usize,
    /// Score to number of ratings with that score.
    pub rating_distribution: BTreeMap<u8, usize>,
}

impl From<UserStatistics> for StatisticsResponse {
    fn from(stats: UserStatistics) -> Self {
        Self {
            total_games_logged: stats.total_games_logged,
            rating_distribution: stats.rating_distribution,
        }
    }
}
