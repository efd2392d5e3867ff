//! Storage trait consumed by the HTTP layer

use crate::error::Result;
use crate::pagination::{Page, PageRequest};
use crate::types::{
    CreatePlaylist, CreateTrack, CreateUser, Playlist, PlaylistId, PlaylistScope,
    PlaylistWithTracks, Reaction, ReactionWithTrack, ReviewFilter, ReviewId, ReviewWithUser,
    Track, TrackFilter, TrackId, TrackWithStats, UpdatePlaylist, UpdateUser, User, UserId,
};
use async_trait::async_trait;

/// Catalog persistence
///
/// Playlist mutations take the calling user and perform the ownership and
/// existence checks themselves, inside the same transaction that rewrites
/// positions. They return the full ordered playlist so callers can resync
/// without a second read.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // ========================================================================
    // Users
    // ========================================================================

    /// Create a user; username and email must be unused
    async fn create_user(&self, user: CreateUser) -> Result<User>;

    /// Get user by ID
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Look up a user and their password hash by username
    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>>;

    /// List users ordered by ID
    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>>;

    /// Apply a partial update, re-checking username/email uniqueness
    async fn update_user(&self, id: UserId, update: UpdateUser) -> Result<User>;

    /// Delete a user together with everything they own
    async fn delete_user(&self, id: UserId) -> Result<()>;

    // ========================================================================
    // Tracks
    // ========================================================================

    /// Filtered, paginated track listing
    async fn list_tracks(&self, filter: TrackFilter, page: PageRequest) -> Result<Page<Track>>;

    /// Get track by ID
    async fn get_track(&self, id: TrackId) -> Result<Option<Track>>;

    /// Track with reaction/review counts; per-caller flags when `caller` is set
    async fn get_track_with_stats(
        &self,
        id: TrackId,
        caller: Option<UserId>,
    ) -> Result<Option<TrackWithStats>>;

    /// Create a new track
    async fn create_track(&self, track: CreateTrack) -> Result<Track>;

    /// Delete a track, detaching it from every playlist that contains it
    async fn delete_track(&self, id: TrackId) -> Result<Track>;

    // ========================================================================
    // Playlists
    // ========================================================================

    /// Playlists visible to `caller`, filtered by `scope`
    async fn list_playlists(
        &self,
        caller: UserId,
        scope: PlaylistScope,
        page: PageRequest,
    ) -> Result<Page<Playlist>>;

    /// Create a playlist owned by `owner`
    async fn create_playlist(&self, owner: UserId, playlist: CreatePlaylist) -> Result<Playlist>;

    /// Get playlist metadata without access checks
    async fn get_playlist(&self, id: PlaylistId) -> Result<Option<Playlist>>;

    /// Playlist with entries in position order, if visible to `caller`
    async fn get_playlist_with_tracks(
        &self,
        id: PlaylistId,
        caller: Option<UserId>,
    ) -> Result<PlaylistWithTracks>;

    /// Owner-only partial update
    async fn update_playlist(
        &self,
        id: PlaylistId,
        caller: UserId,
        update: UpdatePlaylist,
    ) -> Result<Playlist>;

    /// Owner-only cover replacement; returns the updated playlist and the
    /// previous cover path
    async fn set_playlist_cover(
        &self,
        id: PlaylistId,
        caller: UserId,
        cover_path: String,
    ) -> Result<(Playlist, Option<String>)>;

    /// Owner-only delete, cascading entries
    async fn delete_playlist(&self, id: PlaylistId, caller: UserId) -> Result<()>;

    /// Add a track at the end, or at `position` shifting the tail back
    async fn insert_playlist_track(
        &self,
        id: PlaylistId,
        caller: UserId,
        track_id: TrackId,
        position: Option<i64>,
    ) -> Result<PlaylistWithTracks>;

    /// Move a member track to `position`
    async fn move_playlist_track(
        &self,
        id: PlaylistId,
        caller: UserId,
        track_id: TrackId,
        position: i64,
    ) -> Result<PlaylistWithTracks>;

    /// Remove a member track, closing the gap
    async fn remove_playlist_track(
        &self,
        id: PlaylistId,
        caller: UserId,
        track_id: TrackId,
    ) -> Result<PlaylistWithTracks>;

    // ========================================================================
    // Favorites and dislikes
    // ========================================================================

    /// Paginated favorites or dislikes of a user
    async fn list_reactions(
        &self,
        user_id: UserId,
        reaction: Reaction,
        page: PageRequest,
    ) -> Result<Page<ReactionWithTrack>>;

    /// Mark a track, clearing the opposite reaction; idempotent
    async fn add_reaction(
        &self,
        user_id: UserId,
        track_id: TrackId,
        reaction: Reaction,
    ) -> Result<ReactionWithTrack>;

    /// Unmark a track; `NotFound` if it was not marked
    async fn remove_reaction(
        &self,
        user_id: UserId,
        track_id: TrackId,
        reaction: Reaction,
    ) -> Result<()>;

    // ========================================================================
    // Reviews
    // ========================================================================

    /// Paginated reviews with authors
    async fn list_reviews(
        &self,
        filter: ReviewFilter,
        page: PageRequest,
    ) -> Result<Page<ReviewWithUser>>;

    /// Create a review; one per user and track
    async fn create_review(
        &self,
        user_id: UserId,
        track_id: TrackId,
        text: String,
    ) -> Result<ReviewWithUser>;

    /// Get review by ID
    async fn get_review(&self, id: ReviewId) -> Result<Option<ReviewWithUser>>;

    /// Replace review text
    async fn update_review(&self, id: ReviewId, text: String) -> Result<ReviewWithUser>;

    /// Delete a review
    async fn delete_review(&self, id: ReviewId) -> Result<()>;
}
