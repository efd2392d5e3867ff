//! Playlists and their track ordering
//!
//! Every mutation of a playlist's entries follows the same shape:
//!
//! 1. Open a transaction whose first statement writes the playlist row. That
//!    takes the database write lock, so overlapping requests on the same
//!    playlist queue behind each other instead of reading stale positions.
//! 2. Check existence and ownership.
//! 3. Load the entries into a [`TrackOrder`] and plan the change.
//! 4. Write every planned position, then commit.
//!
//! Positions are written in two passes. Rows that move are first parked at
//! the negation of their target, then all parked rows are flipped back. Both
//! passes keep `UNIQUE(playlist_id, position)` satisfied after each single
//! row update.

use crate::rows::{self, NOW, TRACK_COLUMNS};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tune_core::ordering::{Change, ReorderPlan, TrackOrder};
use tune_core::pagination::{Page, PageRequest};
use tune_core::{error::Result, types::*, TuneError};

const PLAYLIST_COLUMNS: &str = "p.id, p.user_id, p.name, p.description, p.is_public, \
     p.cover_path, p.created_at, p.updated_at";

fn playlist_from_row(row: &SqliteRow) -> Result<Playlist> {
    Ok(Playlist {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_public: row.try_get::<i64, _>("is_public")? != 0,
        cover_path: row.try_get("cover_path")?,
        created_at: rows::timestamp(row, "created_at")?,
        updated_at: rows::timestamp(row, "updated_at")?,
    })
}

// ============================================================================
// Reads
// ============================================================================

/// Get playlist metadata without access checks
pub async fn get_by_id(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let mut conn = pool.acquire().await?;
    fetch_playlist(&mut conn, id).await
}

/// Playlists visible to `caller`
///
/// [`PlaylistScope::Visible`] returns the caller's own playlists plus every
/// public one; [`PlaylistScope::OwnPrivate`] only the caller's private ones.
pub async fn list(
    pool: &SqlitePool,
    caller: UserId,
    scope: PlaylistScope,
    page: PageRequest,
) -> Result<Page<Playlist>> {
    let filter = match scope {
        PlaylistScope::Visible => "p.user_id = ? OR p.is_public = 1",
        PlaylistScope::OwnPrivate => "p.user_id = ? AND p.is_public = 0",
    };

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM playlists p WHERE {filter}"
    ))
    .bind(caller)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(&format!(
        r#"
        SELECT {PLAYLIST_COLUMNS}
        FROM playlists p
        WHERE {filter}
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ? OFFSET ?
        "#
    ))
    .bind(caller)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let items = rows.iter().map(playlist_from_row).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total, page))
}

/// Playlist with its entries in position order
///
/// Private playlists are only readable by their owner; anonymous callers see
/// public playlists only.
pub async fn get_with_tracks(
    pool: &SqlitePool,
    id: PlaylistId,
    caller: Option<UserId>,
) -> Result<PlaylistWithTracks> {
    let mut conn = pool.acquire().await?;

    let playlist = fetch_playlist(&mut conn, id)
        .await?
        .ok_or_else(|| TuneError::not_found("Playlist", id))?;

    if !playlist.is_visible_to(caller) {
        return Err(TuneError::forbidden("Playlist is private"));
    }

    with_entries(&mut conn, playlist).await
}

async fn fetch_playlist(conn: &mut SqliteConnection, id: PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(&format!(
        "SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(playlist_from_row).transpose()
}

async fn with_entries(conn: &mut SqliteConnection, playlist: Playlist) -> Result<PlaylistWithTracks> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT pt.position, {TRACK_COLUMNS}
        FROM playlist_tracks pt
        INNER JOIN tracks t ON t.id = pt.track_id
        WHERE pt.playlist_id = ?
        ORDER BY pt.position
        "#
    ))
    .bind(playlist.id)
    .fetch_all(&mut *conn)
    .await?;

    let tracks = rows
        .iter()
        .map(|row| {
            Ok(PlaylistEntry {
                track: rows::track(row)?,
                position: row.try_get("position")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PlaylistWithTracks { playlist, tracks })
}

// ============================================================================
// Metadata writes
// ============================================================================

/// Create a playlist owned by `owner`
pub async fn create(pool: &SqlitePool, owner: UserId, playlist: CreatePlaylist) -> Result<Playlist> {
    let result = sqlx::query(
        r#"
        INSERT INTO playlists (user_id, name, description, is_public)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(owner)
    .bind(&playlist.name)
    .bind(&playlist.description)
    .bind(playlist.is_public)
    .execute(pool)
    .await?;

    let id = PlaylistId::new(result.last_insert_rowid());
    tracing::debug!(playlist_id = %id, owner = %owner, "Created playlist");

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| TuneError::storage("Failed to retrieve created playlist"))
}

/// Owner-only partial update
pub async fn update(
    pool: &SqlitePool,
    id: PlaylistId,
    caller: UserId,
    update: UpdatePlaylist,
) -> Result<Playlist> {
    let mut tx = pool.begin().await?;
    lock_owned(&mut tx, id, caller).await?;

    sqlx::query(
        r#"
        UPDATE playlists SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            is_public = COALESCE(?, is_public)
        WHERE id = ?
        "#,
    )
    .bind(&update.name)
    .bind(&update.description)
    .bind(update.is_public)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let playlist = fetch_playlist(&mut tx, id)
        .await?
        .ok_or_else(|| TuneError::not_found("Playlist", id))?;
    tx.commit().await?;

    Ok(playlist)
}

/// Owner-only cover replacement, returning the previous cover path
pub async fn set_cover(
    pool: &SqlitePool,
    id: PlaylistId,
    caller: UserId,
    cover_path: String,
) -> Result<(Playlist, Option<String>)> {
    let mut tx = pool.begin().await?;
    let previous = lock_owned(&mut tx, id, caller).await?.cover_path;

    sqlx::query("UPDATE playlists SET cover_path = ? WHERE id = ?")
        .bind(&cover_path)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let playlist = fetch_playlist(&mut tx, id)
        .await?
        .ok_or_else(|| TuneError::not_found("Playlist", id))?;
    tx.commit().await?;

    Ok((playlist, previous))
}

/// Owner-only delete; entries cascade
pub async fn delete(pool: &SqlitePool, id: PlaylistId, caller: UserId) -> Result<()> {
    let mut tx = pool.begin().await?;
    lock_owned(&mut tx, id, caller).await?;

    sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::debug!(playlist_id = %id, "Deleted playlist");
    Ok(())
}

// ============================================================================
// Ordering engine
// ============================================================================

/// Add a track at the end, or at `position` in `1..=N+1`
pub async fn insert_track(
    pool: &SqlitePool,
    id: PlaylistId,
    caller: UserId,
    track_id: TrackId,
    position: Option<i64>,
) -> Result<PlaylistWithTracks> {
    let mut tx = pool.begin().await?;
    let playlist = lock_owned(&mut tx, id, caller).await?;
    ensure_track_exists(&mut tx, track_id).await?;

    let order = load_order(&mut tx, id).await?;
    let plan = order.plan_insert(track_id, position)?;
    apply_plan(&mut tx, id, &plan).await?;

    let result = with_entries(&mut tx, playlist).await?;
    tx.commit().await?;

    tracing::debug!(
        playlist_id = %id,
        track_id = %track_id,
        shifted = plan.shifts().len(),
        "Inserted playlist track"
    );
    Ok(result)
}

/// Move a member track to `position` in `1..=N`
pub async fn move_track(
    pool: &SqlitePool,
    id: PlaylistId,
    caller: UserId,
    track_id: TrackId,
    position: i64,
) -> Result<PlaylistWithTracks> {
    let mut tx = pool.begin().await?;
    let playlist = lock_owned(&mut tx, id, caller).await?;
    ensure_track_exists(&mut tx, track_id).await?;

    let order = load_order(&mut tx, id).await?;
    let plan = order.plan_move(track_id, position)?;
    apply_plan(&mut tx, id, &plan).await?;

    let result = with_entries(&mut tx, playlist).await?;
    tx.commit().await?;

    tracing::debug!(
        playlist_id = %id,
        track_id = %track_id,
        position,
        shifted = plan.shifts().len(),
        "Moved playlist track"
    );
    Ok(result)
}

/// Remove a member track and close the gap
pub async fn remove_track(
    pool: &SqlitePool,
    id: PlaylistId,
    caller: UserId,
    track_id: TrackId,
) -> Result<PlaylistWithTracks> {
    let mut tx = pool.begin().await?;
    let playlist = lock_owned(&mut tx, id, caller).await?;
    ensure_track_exists(&mut tx, track_id).await?;

    let order = load_order(&mut tx, id).await?;
    let plan = order.plan_remove(track_id)?;
    apply_plan(&mut tx, id, &plan).await?;

    let result = with_entries(&mut tx, playlist).await?;
    tx.commit().await?;

    tracing::debug!(
        playlist_id = %id,
        track_id = %track_id,
        shifted = plan.shifts().len(),
        "Removed playlist track"
    );
    Ok(result)
}

/// Remove `track_id` from every playlist containing it
///
/// Runs inside the caller's transaction; used when a track leaves the
/// catalog. Returns the number of playlists touched.
pub(crate) async fn detach_everywhere(conn: &mut SqliteConnection, track_id: TrackId) -> Result<usize> {
    let playlist_ids: Vec<PlaylistId> =
        sqlx::query_scalar("SELECT playlist_id FROM playlist_tracks WHERE track_id = ?")
            .bind(track_id)
            .fetch_all(&mut *conn)
            .await?;

    for &playlist_id in &playlist_ids {
        touch(conn, playlist_id).await?;
        let order = load_order(conn, playlist_id).await?;
        let plan = order.plan_remove(track_id)?;
        apply_plan(conn, playlist_id, &plan).await?;
    }

    Ok(playlist_ids.len())
}

/// Take the write lock on a playlist and check the caller owns it
async fn lock_owned(conn: &mut SqliteConnection, id: PlaylistId, caller: UserId) -> Result<Playlist> {
    touch(conn, id).await?;

    let playlist = fetch_playlist(conn, id)
        .await?
        .ok_or_else(|| TuneError::not_found("Playlist", id))?;

    if !playlist.is_owned_by(caller) {
        return Err(TuneError::forbidden("Not the playlist owner"));
    }

    Ok(playlist)
}

/// Bump `updated_at`; as the first write of a transaction this acquires the
/// database write lock
async fn touch(conn: &mut SqliteConnection, id: PlaylistId) -> Result<()> {
    let result = sqlx::query(&format!("UPDATE playlists SET updated_at = {NOW} WHERE id = ?"))
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TuneError::not_found("Playlist", id));
    }
    Ok(())
}

async fn ensure_track_exists(conn: &mut SqliteConnection, track_id: TrackId) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tracks WHERE id = ?)")
        .bind(track_id)
        .fetch_one(&mut *conn)
        .await?;

    if !exists {
        return Err(TuneError::not_found("Track", track_id));
    }
    Ok(())
}

async fn load_order(conn: &mut SqliteConnection, id: PlaylistId) -> Result<TrackOrder> {
    let rows: Vec<(TrackId, i64)> =
        sqlx::query_as("SELECT track_id, position FROM playlist_tracks WHERE playlist_id = ?")
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;

    TrackOrder::from_positions(rows)
}

/// Write a plan: delete, park, insert, unpark
async fn apply_plan(conn: &mut SqliteConnection, id: PlaylistId, plan: &ReorderPlan) -> Result<()> {
    if plan.is_noop() {
        return Ok(());
    }

    if let Change::Remove { track_id, .. } = plan.change() {
        sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?")
            .bind(id)
            .bind(track_id)
            .execute(&mut *conn)
            .await?;
    }

    for (track_id, position) in plan.assignments() {
        sqlx::query("UPDATE playlist_tracks SET position = ? WHERE playlist_id = ? AND track_id = ?")
            .bind(-position)
            .bind(id)
            .bind(track_id)
            .execute(&mut *conn)
            .await?;
    }

    if let Change::Insert { track_id, position } = plan.change() {
        sqlx::query("INSERT INTO playlist_tracks (playlist_id, track_id, position) VALUES (?, ?, ?)")
            .bind(id)
            .bind(track_id)
            .bind(position)
            .execute(&mut *conn)
            .await?;
    }

    sqlx::query("UPDATE playlist_tracks SET position = -position WHERE playlist_id = ? AND position < 0")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
