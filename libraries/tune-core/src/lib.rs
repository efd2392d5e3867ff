//! TuneViewer Core
//!
//! Storage-agnostic domain types, the playlist ordering planner, and error
//! handling for the TuneViewer catalog backend.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, `User`, reviews and reactions
//! - **Ordering**: `TrackOrder`, which plans every position change of a
//!   playlist insert, move or remove before anything is written
//! - **Storage Seam**: the `CatalogStore` trait implemented by `tune-storage`
//! - **Error Handling**: unified `TuneError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use tune_core::ordering::TrackOrder;
//! use tune_core::types::TrackId;
//!
//! let order = TrackOrder::from_tracks(vec![TrackId::new(10), TrackId::new(11)]);
//! let plan = order.plan_insert(TrackId::new(12), Some(1)).unwrap();
//!
//! // Both existing entries move back one slot
//! assert_eq!(plan.shifts().len(), 2);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod ordering;
pub mod pagination;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TuneError};
pub use ordering::{ReorderPlan, TrackOrder};
pub use pagination::{Page, PageRequest};
pub use storage::CatalogStore;

pub use types::{
    CreatePlaylist, CreateTrack, CreateUser, Genre, Playlist, PlaylistEntry, PlaylistId,
    PlaylistScope, PlaylistWithTracks, Reaction, ReactionWithTrack, Review, ReviewFilter,
    ReviewId, ReviewWithUser, Track, TrackFilter, TrackId, TrackWithStats, UpdatePlaylist,
    UpdateUser, User, UserId, UserRole,
};
