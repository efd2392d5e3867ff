/// Server services
pub mod auth;
pub mod file_storage;

pub use auth::AuthService;
pub use file_storage::{FileStorage, MediaKind};
