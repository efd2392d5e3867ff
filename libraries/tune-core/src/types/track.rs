//! Catalog track types

use super::genre::Genre;
use super::ids::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog track
///
/// `cover_path` and `audio_path` are opaque references to stored media,
/// served under `/media`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    /// Duration in seconds
    pub duration: f64,
    pub cover_path: String,
    pub audio_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new track
#[derive(Debug, Clone)]
pub struct CreateTrack {
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub duration: f64,
    pub cover_path: String,
    pub audio_path: String,
}

/// Filters for track listing
#[derive(Debug, Clone, Default)]
pub struct TrackFilter {
    pub genre: Option<Genre>,
    /// Case-insensitive substring of the artist
    pub artist: Option<String>,
    /// Case-insensitive substring of title or artist
    pub search: Option<String>,
}

/// Track with community statistics
#[derive(Debug, Clone, Serialize)]
pub struct TrackWithStats {
    #[serde(flatten)]
    pub track: Track,
    pub favorites_count: i64,
    pub dislikes_count: i64,
    pub reviews_count: i64,
    /// `None` for anonymous callers
    pub is_favorited: Option<bool>,
    pub is_disliked: Option<bool>,
}
