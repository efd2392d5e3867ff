//! Row mapping shared by the slices

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tune_core::error::{Result, TuneError};
use tune_core::types::{Genre, Track, User, UserRole};

/// Columns selected for a track joined under the alias `t`
pub(crate) const TRACK_COLUMNS: &str = "t.id AS track_id, t.title, t.artist, t.genre, \
     t.duration, t.cover_path, t.audio_path, \
     t.created_at AS track_created_at, t.updated_at AS track_updated_at";

/// Columns selected for a user joined under the alias `u`
pub(crate) const USER_COLUMNS: &str = "u.id AS user_id, u.username, u.email, u.display_name, \
     u.is_active, u.role, u.created_at AS user_created_at";

/// Current unix time as SQLite computes it
pub(crate) const NOW: &str = "CAST(strftime('%s', 'now') AS INTEGER)";

pub(crate) fn timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let secs: i64 = row.try_get(column)?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TuneError::storage(format!("Invalid timestamp in {}: {}", column, secs)))
}

pub(crate) fn track(row: &SqliteRow) -> Result<Track> {
    let genre: String = row.try_get("genre")?;
    let genre = Genre::normalize(&genre)
        .ok_or_else(|| TuneError::storage(format!("Unknown stored genre: {}", genre)))?;

    Ok(Track {
        id: row.try_get("track_id")?,
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        genre,
        duration: row.try_get("duration")?,
        cover_path: row.try_get("cover_path")?,
        audio_path: row.try_get("audio_path")?,
        created_at: timestamp(row, "track_created_at")?,
        updated_at: timestamp(row, "track_updated_at")?,
    })
}

pub(crate) fn user(row: &SqliteRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    let role = UserRole::parse(&role)
        .ok_or_else(|| TuneError::storage(format!("Unknown stored role: {}", role)))?;

    Ok(User {
        id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        is_active: row.try_get::<i64, _>("is_active")? != 0,
        role,
        created_at: timestamp(row, "user_created_at")?,
    })
}

/// True when `err` is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
