//! TuneViewer Storage
//!
//! `SQLite` persistence for the TuneViewer catalog: users, tracks, playlists
//! and listener feedback.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature owns its own queries and row mapping
//! - **Transactional Ordering**: playlist mutations plan with
//!   [`tune_core::ordering::TrackOrder`] and commit every position change in
//!   one transaction
//! - **Single Entry Point**: [`Database`] implements
//!   [`tune_core::CatalogStore`] by delegating to the slices
//!
//! # Example
//!
//! ```rust,no_run
//! use tune_core::{CatalogStore, PageRequest, TrackFilter};
//! use tune_storage::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("sqlite://tuneviewer.db").await?;
//!
//! let page = db.list_tracks(TrackFilter::default(), PageRequest::default()).await?;
//! println!("{} tracks", page.total);
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod rows;

// Vertical slices
pub mod playlists;
pub mod reactions;
pub mod reviews;
pub mod tracks;
pub mod users;

pub use context::Database;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Called once at startup to bring the schema up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://tuneviewer.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        // Playlist writers queue on the database write lock
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!("SQLite pool ready");

    Ok(pool)
}
