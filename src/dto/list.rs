use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::CustomListEntity,
    dto::{format_system_time, validation::validate_not_blank},
};

/// Payload creating a custom list.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateListRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Payload adding a game to a list.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ListMembershipRequest {
    pub game_id: Uuid,
}

/// A user-owned list of games.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// True for the list maintained from ratings and reviews.
    pub is_default: bool,
    /// Member game ids in insertion order.
    pub games: Vec<Uuid>,
    pub created_at: String,
}

impl From<CustomListEntity> for ListResponse {
    fn from(list: CustomListEntity) -> Self {
        Self {
            id: list.id,
            user_id: list.user_id,
            name: list.name,
            is_default: list.is_default,
            games: list.games.into_iter().collect(),
            created_at: format_system_time(list.created_at),
        }
    }
}
