//! TuneViewer Server Library
//!
//! HTTP API for the TuneViewer catalog: accounts, tracks with uploaded media,
//! ordered playlists and listener feedback.
//!
//! This library exposes the router and its building blocks so integration
//! tests can drive the full stack in-process.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::{auth::AuthService, file_storage::FileStorage};
pub use state::AppState;
