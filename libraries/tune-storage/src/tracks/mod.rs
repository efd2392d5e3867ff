use crate::playlists;
use crate::rows::{self, NOW, TRACK_COLUMNS};
use sqlx::{Row, SqlitePool};
use tune_core::pagination::{Page, PageRequest};
use tune_core::{error::Result, types::*, TuneError};

// Each optional filter is bound twice: once for the NULL test, once for the match
const FILTER: &str = r#"
    (? IS NULL OR t.genre = ?)
    AND (? IS NULL OR t.artist LIKE '%' || ? || '%' ESCAPE '\')
    AND (? IS NULL OR t.title LIKE '%' || ? || '%' ESCAPE '\'
        OR t.artist LIKE '%' || ? || '%' ESCAPE '\')
"#;

/// Filtered, paginated listing, newest first
///
/// Artist and search terms match as case-insensitive substrings; search
/// covers both title and artist.
pub async fn list(pool: &SqlitePool, filter: TrackFilter, page: PageRequest) -> Result<Page<Track>> {
    let genre = filter.genre.map(Genre::as_str);
    let artist = filter.artist.as_deref().map(escape_like);
    let search = filter.search.as_deref().map(escape_like);

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM tracks t WHERE {FILTER}"
    ))
    .bind(genre)
    .bind(genre)
    .bind(&artist)
    .bind(&artist)
    .bind(&search)
    .bind(&search)
    .bind(&search)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(&format!(
        r#"
        SELECT {TRACK_COLUMNS}
        FROM tracks t
        WHERE {FILTER}
        ORDER BY t.created_at DESC, t.id DESC
        LIMIT ? OFFSET ?
        "#
    ))
    .bind(genre)
    .bind(genre)
    .bind(&artist)
    .bind(&artist)
    .bind(&search)
    .bind(&search)
    .bind(&search)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let items = rows.iter().map(rows::track).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total, page))
}

/// Get track by ID
pub async fn get_by_id(pool: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("SELECT {TRACK_COLUMNS} FROM tracks t WHERE t.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(rows::track).transpose()
}

/// Track with feedback counters
///
/// `is_favorited` and `is_disliked` are only filled in for a known caller.
pub async fn get_with_stats(
    pool: &SqlitePool,
    id: TrackId,
    caller: Option<UserId>,
) -> Result<Option<TrackWithStats>> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {TRACK_COLUMNS},
            (SELECT COUNT(*) FROM favorites f WHERE f.track_id = t.id) AS favorites_count,
            (SELECT COUNT(*) FROM dislikes d WHERE d.track_id = t.id) AS dislikes_count,
            (SELECT COUNT(*) FROM reviews r WHERE r.track_id = t.id) AS reviews_count,
            EXISTS(SELECT 1 FROM favorites f WHERE f.track_id = t.id AND f.user_id = ?) AS favorited,
            EXISTS(SELECT 1 FROM dislikes d WHERE d.track_id = t.id AND d.user_id = ?) AS disliked
        FROM tracks t
        WHERE t.id = ?
        "#
    ))
    .bind(caller)
    .bind(caller)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let flag = |column: &str| -> Result<Option<bool>> {
        let set: i64 = row.try_get(column)?;
        Ok(caller.map(|_| set != 0))
    };

    Ok(Some(TrackWithStats {
        track: rows::track(&row)?,
        favorites_count: row.try_get("favorites_count")?,
        dislikes_count: row.try_get("dislikes_count")?,
        reviews_count: row.try_get("reviews_count")?,
        is_favorited: flag("favorited")?,
        is_disliked: flag("disliked")?,
    }))
}

/// Create a new track
pub async fn create(pool: &SqlitePool, track: CreateTrack) -> Result<Track> {
    let result = sqlx::query(
        r#"
        INSERT INTO tracks (title, artist, genre, duration, cover_path, audio_path)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&track.title)
    .bind(&track.artist)
    .bind(track.genre.as_str())
    .bind(track.duration)
    .bind(&track.cover_path)
    .bind(&track.audio_path)
    .execute(pool)
    .await?;

    let id = TrackId::new(result.last_insert_rowid());
    tracing::debug!(track_id = %id, title = %track.title, "Created track");

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| TuneError::storage("Failed to retrieve created track"))
}

/// Delete a track
///
/// The track is first removed from every playlist that holds it, closing the
/// gap in each, within the same transaction as the delete itself. Reactions
/// and reviews cascade.
pub async fn delete(pool: &SqlitePool, id: TrackId) -> Result<Track> {
    let mut tx = pool.begin().await?;

    // First statement writes, so the transaction holds the write lock from here on
    let touched = sqlx::query(&format!("UPDATE tracks SET updated_at = {NOW} WHERE id = ?"))
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if touched.rows_affected() == 0 {
        return Err(TuneError::not_found("Track", id));
    }

    let row = sqlx::query(&format!("SELECT {TRACK_COLUMNS} FROM tracks t WHERE t.id = ?"))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    let track = rows::track(&row)?;

    let detached = playlists::detach_everywhere(&mut tx, id).await?;

    sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(track_id = %id, playlists = detached, "Deleted track");
    Ok(track)
}

/// Escape `%` and `_` so user input matches literally inside LIKE
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
