use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::ReviewEntity,
    dto::{format_system_time, validation::validate_not_blank},
};

/// Payload writing or editing a review.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitReviewRequest {
    #[validate(length(min = 1, max = 10000), custom(function = "validate_not_blank"))]
    pub text: String,
}

/// A user's review of a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub text: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ReviewEntity> for ReviewResponse {
    fn from(review: ReviewEntity) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            game_id: review.game_id,
            text: review.text,
            created_at: format_system_time(review.created_at),
            updated_at: format_system_time(review.updated_at),
        }
    }
}
