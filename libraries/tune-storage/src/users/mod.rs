use crate::rows::{self, NOW, USER_COLUMNS};
use sqlx::{Row, SqlitePool};
use tune_core::{error::Result, types::*, TuneError};

/// Get user by ID
pub async fn get_by_id(pool: &SqlitePool, id: UserId) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(rows::user).transpose()
}

/// Find a user and their password hash by username
pub async fn find_credentials(pool: &SqlitePool, username: &str) -> Result<Option<(User, String)>> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {USER_COLUMNS}, c.password_hash
        FROM users u
        INNER JOIN user_credentials c ON c.user_id = u.id
        WHERE u.username = ?
        "#
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let user = rows::user(&row)?;
            let hash: String = row.try_get("password_hash")?;
            Ok(Some((user, hash)))
        }
        None => Ok(None),
    }
}

/// List users ordered by ID
pub async fn list(pool: &SqlitePool, skip: i64, limit: i64) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!(
        "SELECT {USER_COLUMNS} FROM users u ORDER BY u.id LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    rows.iter().map(rows::user).collect()
}

/// Create a user with credentials
///
/// Username and email are checked up front so the caller gets a message that
/// names the clashing field.
pub async fn create(pool: &SqlitePool, user: CreateUser) -> Result<User> {
    ensure_unique(pool, None, Some(&user.username), Some(&user.email)).await?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, display_name, role)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.display_name)
    .bind(user.role.as_str())
    .execute(&mut *tx)
    .await
    .map_err(unique_to_conflict)?;

    let id = result.last_insert_rowid();

    sqlx::query("INSERT INTO user_credentials (user_id, password_hash) VALUES (?, ?)")
        .bind(id)
        .bind(&user.password_hash)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get_by_id(pool, UserId::new(id))
        .await?
        .ok_or_else(|| TuneError::storage("Failed to retrieve created user"))
}

/// Apply a partial update
pub async fn update(pool: &SqlitePool, id: UserId, update: UpdateUser) -> Result<User> {
    if get_by_id(pool, id).await?.is_none() {
        return Err(TuneError::not_found("User", id));
    }

    ensure_unique(
        pool,
        Some(id),
        update.username.as_deref(),
        update.email.as_deref(),
    )
    .await?;

    let mut tx = pool.begin().await?;

    sqlx::query(&format!(
        r#"
        UPDATE users SET
            username = COALESCE(?, username),
            email = COALESCE(?, email),
            display_name = COALESCE(?, display_name),
            updated_at = {NOW}
        WHERE id = ?
        "#
    ))
    .bind(&update.username)
    .bind(&update.email)
    .bind(&update.display_name)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(unique_to_conflict)?;

    if let Some(hash) = &update.password_hash {
        sqlx::query(&format!(
            "UPDATE user_credentials SET password_hash = ?, updated_at = {NOW} WHERE user_id = ?"
        ))
        .bind(hash)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| TuneError::not_found("User", id))
}

/// Delete a user; playlists, reactions and reviews cascade
pub async fn delete(pool: &SqlitePool, id: UserId) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TuneError::not_found("User", id));
    }

    Ok(())
}

async fn ensure_unique(
    pool: &SqlitePool,
    except: Option<UserId>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<()> {
    let except = except.map_or(0, UserId::get);

    if let Some(username) = username {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? AND id != ?)",
        )
        .bind(username)
        .bind(except)
        .fetch_one(pool)
        .await?;
        if taken {
            return Err(TuneError::conflict("Username already registered"));
        }
    }

    if let Some(email) = email {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? AND id != ?)")
                .bind(email)
                .bind(except)
                .fetch_one(pool)
                .await?;
        if taken {
            return Err(TuneError::conflict("Email already registered"));
        }
    }

    Ok(())
}

// Two concurrent registrations can both pass `ensure_unique`
fn unique_to_conflict(err: sqlx::Error) -> TuneError {
    if rows::is_unique_violation(&err) {
        TuneError::conflict("Username or email already registered")
    } else {
        err.into()
    }
}
