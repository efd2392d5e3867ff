/// Track API routes
use crate::{
    api::{multipart::MultipartForm, page_request},
    error::{Result, ServerError},
    middleware::{AdminUser, AuthenticatedUser},
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
use tune_core::{CreateTrack, Genre, Page, Track, TrackFilter, TrackId, TrackWithStats};

#[derive(Debug, Default, Deserialize)]
pub struct TrackQuery {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// GET /api/v1/tracks
pub async fn list_tracks(
    State(app_state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> Result<Json<Page<Track>>> {
    let page = page_request(query.page, query.size)?;

    let genre = match query.genre.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match Genre::normalize(raw) {
            Some(genre) => Some(genre),
            // Unknown genres match nothing
            None => return Ok(Json(Page::empty(page))),
        },
    };

    let filter = TrackFilter {
        genre,
        artist: non_blank(query.artist),
        search: non_blank(query.search),
    };

    Ok(Json(app_state.db.list_tracks(filter, page).await?))
}

/// GET /api/v1/tracks/:id
pub async fn get_track(
    Path(id): Path<TrackId>,
    State(app_state): State<AppState>,
    auth: Option<AuthenticatedUser>,
) -> Result<Json<TrackWithStats>> {
    let track = app_state
        .db
        .get_track_with_stats(id, auth.map(|a| a.user_id))
        .await?
        .ok_or_else(|| ServerError::NotFound("Track not found".to_string()))?;
    Ok(Json(track))
}

/// POST /api/v1/tracks (admin, multipart)
///
/// Text fields `title`, `artist`, `genre`, `duration`; files `cover` and
/// `audio`. Stored files are removed again when the catalog insert fails.
pub async fn create_track(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Track>> {
    let mut form = MultipartForm::parse(&headers, body).await?;

    let title = required(form.text("title")?, "title")?;
    let artist = required(form.text("artist")?, "artist")?;
    let genre_raw = form.text("genre")?;
    let genre = Genre::normalize(genre_raw).ok_or_else(|| {
        ServerError::BadRequest(format!(
            "Invalid genre: {}. Valid genres: {}",
            genre_raw,
            Genre::valid_values()
        ))
    })?;
    let duration: f64 = form
        .text("duration")?
        .trim()
        .parse()
        .map_err(|_| ServerError::Validation("Duration must be a number".to_string()))?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ServerError::Validation(
            "Duration must be greater than zero".to_string(),
        ));
    }

    let cover = form.take_file("cover")?;
    let audio = form.take_file("audio")?;

    let storage = &app_state.file_storage;
    let cover_ext = storage.validate_upload(MediaKind::Cover, &cover.filename, cover.data.len())?;
    let audio_ext = storage.validate_upload(MediaKind::Track, &audio.filename, audio.data.len())?;

    let cover_path = storage.store(MediaKind::Cover, &cover_ext, &cover.data).await?;
    let audio_path = match storage.store(MediaKind::Track, &audio_ext, &audio.data).await {
        Ok(path) => path,
        Err(e) => {
            storage.discard(&cover_path).await;
            return Err(e);
        }
    };

    let created = app_state
        .db
        .create_track(CreateTrack {
            title,
            artist,
            genre,
            duration,
            cover_path: cover_path.clone(),
            audio_path: audio_path.clone(),
        })
        .await;

    match created {
        Ok(track) => {
            tracing::info!("Track {} uploaded: {} - {}", track.id, track.artist, track.title);
            Ok(Json(track))
        }
        Err(e) => {
            storage.discard(&cover_path).await;
            storage.discard(&audio_path).await;
            Err(e.into())
        }
    }
}

/// DELETE /api/v1/tracks/:id (admin)
pub async fn delete_track(
    Path(id): Path<TrackId>,
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> Result<StatusCode> {
    let track = app_state.db.delete_track(id).await?;

    app_state.file_storage.discard(&track.cover_path).await;
    app_state.file_storage.discard(&track.audio_path).await;

    Ok(StatusCode::NO_CONTENT)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: &str, name: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServerError::Validation(format!("{name} must not be empty")));
    }
    Ok(value.to_string())
}
