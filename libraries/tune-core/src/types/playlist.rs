/// Playlist domain types
use super::ids::{PlaylistId, UserId};
use super::track::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Playlist metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    /// Owner user ID
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub cover_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Owner always; anyone (including anonymous callers) when public
    pub fn is_visible_to(&self, caller: Option<UserId>) -> bool {
        self.is_public || caller.is_some_and(|id| self.is_owned_by(id))
    }
}

/// Data for creating a new playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylist {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

/// Partial playlist update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlaylist {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Visibility filter for playlist listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaylistScope {
    /// Caller's playlists plus everyone's public playlists
    #[default]
    Visible,
    /// Only the caller's private playlists
    OwnPrivate,
}

/// One track at one position inside a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub track: Track,
    /// 1-based, dense within the playlist
    pub position: i64,
}

/// Playlist together with its ordered entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistWithTracks {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub tracks: Vec<PlaylistEntry>,
}
