use crate::error::StorageError;
use crate::{playlists, reactions, reviews, tracks, users};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tune_core::pagination::{Page, PageRequest};
use tune_core::{error::Result, storage::CatalogStore, types::*};

/// `SQLite`-backed catalog store
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `database_url` and run
    /// migrations
    pub async fn new(database_url: &str) -> std::result::Result<Self, StorageError> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing, already migrated pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for Database {
    // Users
    async fn create_user(&self, user: CreateUser) -> Result<User> {
        users::create(&self.pool, user).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        users::get_by_id(&self.pool, id).await
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        users::find_credentials(&self.pool, username).await
    }

    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>> {
        users::list(&self.pool, skip, limit).await
    }

    async fn update_user(&self, id: UserId, update: UpdateUser) -> Result<User> {
        users::update(&self.pool, id, update).await
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        users::delete(&self.pool, id).await
    }

    // Tracks
    async fn list_tracks(&self, filter: TrackFilter, page: PageRequest) -> Result<Page<Track>> {
        tracks::list(&self.pool, filter, page).await
    }

    async fn get_track(&self, id: TrackId) -> Result<Option<Track>> {
        tracks::get_by_id(&self.pool, id).await
    }

    async fn get_track_with_stats(
        &self,
        id: TrackId,
        caller: Option<UserId>,
    ) -> Result<Option<TrackWithStats>> {
        tracks::get_with_stats(&self.pool, id, caller).await
    }

    async fn create_track(&self, track: CreateTrack) -> Result<Track> {
        tracks::create(&self.pool, track).await
    }

    async fn delete_track(&self, id: TrackId) -> Result<Track> {
        tracks::delete(&self.pool, id).await
    }

    // Playlists
    async fn list_playlists(
        &self,
        caller: UserId,
        scope: PlaylistScope,
        page: PageRequest,
    ) -> Result<Page<Playlist>> {
        playlists::list(&self.pool, caller, scope, page).await
    }

    async fn create_playlist(&self, owner: UserId, playlist: CreatePlaylist) -> Result<Playlist> {
        playlists::create(&self.pool, owner, playlist).await
    }

    async fn get_playlist(&self, id: PlaylistId) -> Result<Option<Playlist>> {
        playlists::get_by_id(&self.pool, id).await
    }

    async fn get_playlist_with_tracks(
        &self,
        id: PlaylistId,
        caller: Option<UserId>,
    ) -> Result<PlaylistWithTracks> {
        playlists::get_with_tracks(&self.pool, id, caller).await
    }

    async fn update_playlist(
        &self,
        id: PlaylistId,
        caller: UserId,
        update: UpdatePlaylist,
    ) -> Result<Playlist> {
        playlists::update(&self.pool, id, caller, update).await
    }

    async fn set_playlist_cover(
        &self,
        id: PlaylistId,
        caller: UserId,
        cover_path: String,
    ) -> Result<(Playlist, Option<String>)> {
        playlists::set_cover(&self.pool, id, caller, cover_path).await
    }

    async fn delete_playlist(&self, id: PlaylistId, caller: UserId) -> Result<()> {
        playlists::delete(&self.pool, id, caller).await
    }

    async fn insert_playlist_track(
        &self,
        id: PlaylistId,
        caller: UserId,
        track_id: TrackId,
        position: Option<i64>,
    ) -> Result<PlaylistWithTracks> {
        playlists::insert_track(&self.pool, id, caller, track_id, position).await
    }

    async fn move_playlist_track(
        &self,
        id: PlaylistId,
        caller: UserId,
        track_id: TrackId,
        position: i64,
    ) -> Result<PlaylistWithTracks> {
        playlists::move_track(&self.pool, id, caller, track_id, position).await
    }

    async fn remove_playlist_track(
        &self,
        id: PlaylistId,
        caller: UserId,
        track_id: TrackId,
    ) -> Result<PlaylistWithTracks> {
        playlists::remove_track(&self.pool, id, caller, track_id).await
    }

    // Favorites and dislikes
    async fn list_reactions(
        &self,
        user_id: UserId,
        reaction: Reaction,
        page: PageRequest,
    ) -> Result<Page<ReactionWithTrack>> {
        reactions::list(&self.pool, user_id, reaction, page).await
    }

    async fn add_reaction(
        &self,
        user_id: UserId,
        track_id: TrackId,
        reaction: Reaction,
    ) -> Result<ReactionWithTrack> {
        reactions::add(&self.pool, user_id, track_id, reaction).await
    }

    async fn remove_reaction(
        &self,
        user_id: UserId,
        track_id: TrackId,
        reaction: Reaction,
    ) -> Result<()> {
        reactions::remove(&self.pool, user_id, track_id, reaction).await
    }

    // Reviews
    async fn list_reviews(
        &self,
        filter: ReviewFilter,
        page: PageRequest,
    ) -> Result<Page<ReviewWithUser>> {
        reviews::list(&self.pool, filter, page).await
    }

    async fn create_review(
        &self,
        user_id: UserId,
        track_id: TrackId,
        text: String,
    ) -> Result<ReviewWithUser> {
        reviews::create(&self.pool, user_id, track_id, text).await
    }

    async fn get_review(&self, id: ReviewId) -> Result<Option<ReviewWithUser>> {
        reviews::get_by_id(&self.pool, id).await
    }

    async fn update_review(&self, id: ReviewId, text: String) -> Result<ReviewWithUser> {
        reviews::update(&self.pool, id, text).await
    }

    async fn delete_review(&self, id: ReviewId) -> Result<()> {
        reviews::delete(&self.pool, id).await
    }
}
