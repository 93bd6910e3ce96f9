use std::time::SystemTime;

use indexmap::IndexSet;
use time::Date;
use uuid::Uuid;

/// Registered account owning ratings, reviews, lists and follow edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: Uuid,
    /// Unique login handle.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    /// Optional free-form presentation text.
    pub bio: Option<String>,
    /// Optional avatar location.
    pub avatar_url: Option<String>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Locally owned mirror of a game from the external catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    /// Opaque local identifier, never changes.
    pub id: Uuid,
    /// Identifier of the game in the external catalog, unique across records.
    pub external_id: i64,
    pub title: String,
    /// Never empty: a sentinel replaces a missing upstream description.
    pub description: String,
    pub release_date: Option<Date>,
    pub cover_image: Option<String>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
    /// Mean of every current rating score, `0.0` when unrated.
    pub average_rating: f64,
    /// Number of current ratings.
    pub total_ratings: u32,
}

/// One user's 1-5 score for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub score: u8,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// One user's narrative review of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub text: String,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Named, user-owned collection of games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomListEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Exactly one list per user carries this flag; it cannot be deleted.
    pub is_default: bool,
    /// Member game ids, unique, kept in insertion order.
    pub games: IndexSet<Uuid>,
    pub created_at: SystemTime,
}

/// Directed "follower follows following" relation keyed by the ordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowEdgeEntity {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: SystemTime,
}

/// Play status a user attached to a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLogEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub status: PlayStatus,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Lifecycle states tracked by the game log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayStatus {
    Played,
    Playing,
    WantToPlay,
    NotLogged,
}
