/// Shared application state
use crate::services::{AuthService, FileStorage};
use std::sync::Arc;
use tune_core::CatalogStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn CatalogStore>,
    pub auth_service: Arc<AuthService>,
    pub file_storage: Arc<FileStorage>,
}

impl AppState {
    pub fn new(
        db: Arc<dyn CatalogStore>,
        auth_service: Arc<AuthService>,
        file_storage: Arc<FileStorage>,
    ) -> Self {
        Self {
            db,
            auth_service,
            file_storage,
        }
    }
}
