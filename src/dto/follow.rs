use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dao::models::FollowEdgeEntity, dto::format_system_time};

/// Directed follow edge.
#[derive(Debug, Serialize, ToSchema)]
pub struct FollowResponse {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: String,
}

impl From<FollowEdgeEntity> for FollowResponse {
    fn from(edge: FollowEdgeEntity) -> Self {
        Self {
            follower_id: edge.follower_id,
            following_id: edge.following_id,
            created_at: format_system_time(edge.created_at),
        }
    }
}
