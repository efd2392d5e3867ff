/// Playlist API routes
///
/// Entry mutations (`/playlists/:id/tracks`) go straight to the catalog's
/// ordering engine and answer with the whole playlist in position order.
use crate::{
    api::{extract::ApiJson, multipart::MultipartForm, page_request},
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::MediaKind,
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use tune_core::{
    CreatePlaylist, Page, Playlist, PlaylistId, PlaylistScope, PlaylistWithTracks, TrackId,
    UpdatePlaylist,
};

#[derive(Debug, Deserialize)]
pub struct PlaylistQuery {
    pub is_public: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AddTrackRequest {
    pub track_id: TrackId,
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MoveTrackRequest {
    pub position: i64,
}

/// GET /api/v1/playlists
///
/// The caller's playlists plus public ones; `is_public=false` narrows to the
/// caller's private playlists.
pub async fn list_playlists(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PlaylistQuery>,
) -> Result<Json<Page<Playlist>>> {
    let page = page_request(query.page, query.size)?;
    let scope = match query.is_public {
        Some(false) => PlaylistScope::OwnPrivate,
        _ => PlaylistScope::Visible,
    };

    let playlists = app_state
        .db
        .list_playlists(auth.user_id, scope, page)
        .await?;
    Ok(Json(playlists))
}

/// POST /api/v1/playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<CreatePlaylistRequest>,
) -> Result<Json<Playlist>> {
    let playlist = app_state
        .db
        .create_playlist(
            auth.user_id,
            CreatePlaylist {
                name: playlist_name(&req.name)?,
                description: req.description,
                is_public: req.is_public,
            },
        )
        .await?;
    Ok(Json(playlist))
}

/// GET /api/v1/playlists/:id
pub async fn get_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: Option<AuthenticatedUser>,
) -> Result<Json<PlaylistWithTracks>> {
    let playlist = app_state
        .db
        .get_playlist_with_tracks(id, auth.map(|a| a.user_id))
        .await?;
    Ok(Json(playlist))
}

/// PUT /api/v1/playlists/:id
pub async fn update_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdatePlaylistRequest>,
) -> Result<Json<Playlist>> {
    let name = req.name.as_deref().map(playlist_name).transpose()?;

    let playlist = app_state
        .db
        .update_playlist(
            id,
            auth.user_id,
            UpdatePlaylist {
                name,
                description: req.description,
                is_public: req.is_public,
            },
        )
        .await?;
    Ok(Json(playlist))
}

/// DELETE /api/v1/playlists/:id
pub async fn delete_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    let cover = app_state
        .db
        .get_playlist(id)
        .await?
        .and_then(|p| p.cover_path);

    app_state.db.delete_playlist(id, auth.user_id).await?;

    if let Some(cover) = cover {
        app_state.file_storage.discard(&cover).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/playlists/:id/cover (multipart `cover`)
pub async fn upload_cover(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Playlist>> {
    // Owner check precedes writing the file
    let playlist = app_state
        .db
        .get_playlist(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Playlist not found".to_string()))?;
    if !playlist.is_owned_by(auth.user_id) {
        return Err(ServerError::Forbidden("Not the playlist owner".to_string()));
    }

    let mut form = MultipartForm::parse(&headers, body).await?;
    let cover = form.take_file("cover")?;

    let storage = &app_state.file_storage;
    let ext = storage.validate_upload(MediaKind::Cover, &cover.filename, cover.data.len())?;
    let cover_path = storage.store(MediaKind::Cover, &ext, &cover.data).await?;

    match app_state
        .db
        .set_playlist_cover(id, auth.user_id, cover_path.clone())
        .await
    {
        Ok((playlist, previous)) => {
            if let Some(previous) = previous {
                storage.discard(&previous).await;
            }
            Ok(Json(playlist))
        }
        Err(e) => {
            storage.discard(&cover_path).await;
            Err(e.into())
        }
    }
}

/// POST /api/v1/playlists/:id/tracks
pub async fn add_track(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<AddTrackRequest>,
) -> Result<Json<PlaylistWithTracks>> {
    let playlist = app_state
        .db
        .insert_playlist_track(id, auth.user_id, req.track_id, req.position)
        .await?;
    Ok(Json(playlist))
}

/// PUT /api/v1/playlists/:id/tracks/:track_id
pub async fn move_track(
    Path((id, track_id)): Path<(PlaylistId, TrackId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<MoveTrackRequest>,
) -> Result<Json<PlaylistWithTracks>> {
    let playlist = app_state
        .db
        .move_playlist_track(id, auth.user_id, track_id, req.position)
        .await?;
    Ok(Json(playlist))
}

/// DELETE /api/v1/playlists/:id/tracks/:track_id
pub async fn remove_track(
    Path((id, track_id)): Path<(PlaylistId, TrackId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<PlaylistWithTracks>> {
    let playlist = app_state
        .db
        .remove_playlist_track(id, auth.user_id, track_id)
        .await?;
    Ok(Json(playlist))
}

fn playlist_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServerError::Validation(
            "Playlist name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}
