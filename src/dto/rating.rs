use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::RatingEntity, dto::format_system_time};

/// Payload submitting or replacing the caller's score for a game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitRatingRequest {
    /// Score between 1 and 5.
    #[validate(range(min = 1, max = 5))]
    pub score: i32,
}

/// A user's score for a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct RatingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub score: u8,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RatingEntity> for RatingResponse {
    fn from(rating: RatingEntity) -> Self {
        Self {
            id: rating.id,
            user_id: rating.user_id,
            game_id: rating.game_id,
            score: rating.score,
            created_at: format_system_time(rating.created_at),
            updated_at: format_system_time(rating.updated_at),
        }
    }
}
