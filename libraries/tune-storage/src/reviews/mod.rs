use crate::rows::{self, NOW, USER_COLUMNS};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tune_core::pagination::{Page, PageRequest};
use tune_core::{error::Result, types::*, TuneError};

const FILTER: &str = "(? IS NULL OR r.track_id = ?) AND (? IS NULL OR r.user_id = ?)";

fn from_row(row: &SqliteRow) -> Result<ReviewWithUser> {
    let user = rows::user(row)?;
    Ok(ReviewWithUser {
        review: Review {
            id: row.try_get("review_id")?,
            user_id: user.id,
            track_id: row.try_get("track_id")?,
            text: row.try_get("text")?,
            created_at: rows::timestamp(row, "review_created_at")?,
            updated_at: rows::timestamp(row, "review_updated_at")?,
        },
        user,
    })
}

fn select() -> String {
    format!(
        r#"
        SELECT r.id AS review_id, r.track_id, r.text,
               r.created_at AS review_created_at, r.updated_at AS review_updated_at,
               {USER_COLUMNS}
        FROM reviews r
        INNER JOIN users u ON u.id = r.user_id
        "#
    )
}

/// Reviews matching `filter`, newest first
pub async fn list(
    pool: &SqlitePool,
    filter: ReviewFilter,
    page: PageRequest,
) -> Result<Page<ReviewWithUser>> {
    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM reviews r WHERE {FILTER}"
    ))
    .bind(filter.track_id)
    .bind(filter.track_id)
    .bind(filter.user_id)
    .bind(filter.user_id)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(&format!(
        "{} WHERE {FILTER} ORDER BY r.created_at DESC, r.id DESC LIMIT ? OFFSET ?",
        select()
    ))
    .bind(filter.track_id)
    .bind(filter.track_id)
    .bind(filter.user_id)
    .bind(filter.user_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let items = rows.iter().map(from_row).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total, page))
}

/// Get review by ID
pub async fn get_by_id(pool: &SqlitePool, id: ReviewId) -> Result<Option<ReviewWithUser>> {
    let row = sqlx::query(&format!("{} WHERE r.id = ?", select()))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Create a review; a user may review each track once
pub async fn create(
    pool: &SqlitePool,
    user_id: UserId,
    track_id: TrackId,
    text: String,
) -> Result<ReviewWithUser> {
    let track_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tracks WHERE id = ?)")
        .bind(track_id)
        .fetch_one(pool)
        .await?;
    if !track_exists {
        return Err(TuneError::not_found("Track", track_id));
    }

    let result = sqlx::query("INSERT INTO reviews (user_id, track_id, text) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(track_id)
        .bind(&text)
        .execute(pool)
        .await
        .map_err(|err| {
            if rows::is_unique_violation(&err) {
                TuneError::conflict("Track already reviewed by this user")
            } else {
                err.into()
            }
        })?;

    let id = ReviewId::new(result.last_insert_rowid());
    get_by_id(pool, id)
        .await?
        .ok_or_else(|| TuneError::storage("Failed to retrieve created review"))
}

/// Replace the text of a review
pub async fn update(pool: &SqlitePool, id: ReviewId, text: String) -> Result<ReviewWithUser> {
    let result = sqlx::query(&format!(
        "UPDATE reviews SET text = ?, updated_at = {NOW} WHERE id = ?"
    ))
    .bind(&text)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(TuneError::not_found("Review", id));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| TuneError::not_found("Review", id))
}

/// Delete a review
pub async fn delete(pool: &SqlitePool, id: ReviewId) -> Result<()> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TuneError::not_found("Review", id));
    }

    Ok(())
}
