//! Per-user reactions to tracks: favorites, dislikes and reviews

use super::ids::{ReviewId, TrackId, UserId};
use super::track::Track;
use super::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which reaction list a track is marked in
///
/// A track is never in both lists for the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Favorite,
    Dislike,
}

impl Reaction {
    pub fn opposite(self) -> Self {
        match self {
            Reaction::Favorite => Reaction::Dislike,
            Reaction::Dislike => Reaction::Favorite,
        }
    }
}

/// A favorite or dislike record with the referenced track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionWithTrack {
    pub id: i64,
    pub user_id: UserId,
    pub track_id: TrackId,
    pub track: Track,
}

/// A written review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub track_id: TrackId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review with its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewWithUser {
    #[serde(flatten)]
    pub review: Review,
    pub user: User,
}

/// Filters for review listing
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewFilter {
    pub track_id: Option<TrackId>,
    pub user_id: Option<UserId>,
}
