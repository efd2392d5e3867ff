//! Favorites and dislikes
//!
//! The two tables share a shape, so one set of queries serves both, keyed by
//! [`Reaction`]. A user can hold at most one of the two for a given track:
//! adding one deletes the other in the same transaction.

use crate::rows::{self, TRACK_COLUMNS};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tune_core::pagination::{Page, PageRequest};
use tune_core::{error::Result, types::*, TuneError};

fn table(reaction: Reaction) -> &'static str {
    match reaction {
        Reaction::Favorite => "favorites",
        Reaction::Dislike => "dislikes",
    }
}

fn from_row(row: &SqliteRow) -> Result<ReactionWithTrack> {
    Ok(ReactionWithTrack {
        id: row.try_get("reaction_id")?,
        user_id: row.try_get("user_id")?,
        track_id: row.try_get("track_id")?,
        track: rows::track(row)?,
    })
}

/// A user's favorites or dislikes, most recent first
pub async fn list(
    pool: &SqlitePool,
    user_id: UserId,
    reaction: Reaction,
    page: PageRequest,
) -> Result<Page<ReactionWithTrack>> {
    let table = table(reaction);

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table} WHERE user_id = ?"
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(&format!(
        r#"
        SELECT r.id AS reaction_id, r.user_id, {TRACK_COLUMNS}
        FROM {table} r
        INNER JOIN tracks t ON t.id = r.track_id
        WHERE r.user_id = ?
        ORDER BY r.created_at DESC, r.id DESC
        LIMIT ? OFFSET ?
        "#
    ))
    .bind(user_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let items = rows.iter().map(from_row).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total, page))
}

/// Mark a track; an existing mark is returned unchanged
pub async fn add(
    pool: &SqlitePool,
    user_id: UserId,
    track_id: TrackId,
    reaction: Reaction,
) -> Result<ReactionWithTrack> {
    let mut tx = pool.begin().await?;

    sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = ? AND track_id = ?",
        table(reaction.opposite())
    ))
    .bind(user_id)
    .bind(track_id)
    .execute(&mut *tx)
    .await?;

    let track_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tracks WHERE id = ?)")
        .bind(track_id)
        .fetch_one(&mut *tx)
        .await?;
    if !track_exists {
        return Err(TuneError::not_found("Track", track_id));
    }

    sqlx::query(&format!(
        "INSERT INTO {} (user_id, track_id) VALUES (?, ?) ON CONFLICT(user_id, track_id) DO NOTHING",
        table(reaction)
    ))
    .bind(user_id)
    .bind(track_id)
    .execute(&mut *tx)
    .await?;

    let record = fetch(&mut tx, user_id, track_id, reaction)
        .await?
        .ok_or_else(|| TuneError::storage("Failed to retrieve reaction"))?;
    tx.commit().await?;

    Ok(record)
}

/// Unmark a track
pub async fn remove(
    pool: &SqlitePool,
    user_id: UserId,
    track_id: TrackId,
    reaction: Reaction,
) -> Result<()> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = ? AND track_id = ?",
        table(reaction)
    ))
    .bind(user_id)
    .bind(track_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        let entity = match reaction {
            Reaction::Favorite => "Favorite",
            Reaction::Dislike => "Dislike",
        };
        return Err(TuneError::not_found(entity, track_id));
    }

    Ok(())
}

async fn fetch(
    conn: &mut SqliteConnection,
    user_id: UserId,
    track_id: TrackId,
    reaction: Reaction,
) -> Result<Option<ReactionWithTrack>> {
    let row = sqlx::query(&format!(
        r#"
        SELECT r.id AS reaction_id, r.user_id, {TRACK_COLUMNS}
        FROM {} r
        INNER JOIN tracks t ON t.id = r.track_id
        WHERE r.user_id = ? AND r.track_id = ?
        "#,
        table(reaction)
    ))
    .bind(user_id)
    .bind(track_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(from_row).transpose()
}
