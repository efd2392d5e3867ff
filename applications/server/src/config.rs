/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub uploads: UploadSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS; empty allows none
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Directory holding `covers/` and `tracks/`, served under `/media`
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,

    #[serde(default = "default_jwt_refresh_expiration_days")]
    pub jwt_refresh_expiration_days: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_cover_size_mb")]
    pub max_cover_size_mb: u64,

    #[serde(default = "default_max_track_size_mb")]
    pub max_track_size_mb: u64,

    #[serde(default = "default_cover_extensions")]
    pub cover_extensions: Vec<String>,

    #[serde(default = "default_track_extensions")]
    pub track_extensions: Vec<String>,
}

impl UploadSettings {
    pub fn max_cover_bytes(&self) -> usize {
        (self.max_cover_size_mb * 1024 * 1024) as usize
    }

    pub fn max_track_bytes(&self) -> usize {
        (self.max_track_size_mb * 1024 * 1024) as usize
    }

    /// Largest request body an upload route has to accept
    pub fn max_request_bytes(&self) -> usize {
        self.max_cover_bytes() + self.max_track_bytes() + 1024 * 1024
    }
}

impl ServerConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Without an explicit path, `config.toml` in the working directory is
    /// read if present. Environment variables prefixed with `TUNE_` override
    /// file values, using `__` between section and key
    /// (`TUNE_AUTH__JWT_SECRET`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("TUNE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .with_list_parse_key("uploads.cover_extensions")
                .with_list_parse_key("uploads.track_extensions"),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set TUNE_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.uploads.max_cover_size_mb == 0 || self.uploads.max_track_size_mb == 0 {
            return Err(ServerError::Config(
                "Upload size limits must be greater than zero".to_string(),
            ));
        }

        if self.uploads.cover_extensions.is_empty() || self.uploads.track_extensions.is_empty() {
            return Err(ServerError::Config(
                "Upload extension lists must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            media_root: default_media_root(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiration_hours: default_jwt_expiration_hours(),
            jwt_refresh_expiration_days: default_jwt_refresh_expiration_days(),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_cover_size_mb: default_max_cover_size_mb(),
            max_track_size_mb: default_max_track_size_mb(),
            cover_extensions: default_cover_extensions(),
            track_extensions: default_track_extensions(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:8000".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_database_url() -> String {
    "sqlite://./data/tuneviewer.db".to_string()
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./data/media")
}

fn default_jwt_expiration_hours() -> u64 {
    24 * 7
}

fn default_jwt_refresh_expiration_days() -> u64 {
    30
}

fn default_max_cover_size_mb() -> u64 {
    5
}

fn default_max_track_size_mb() -> u64 {
    20
}

fn default_cover_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "webp"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_track_extensions() -> Vec<String> {
    ["mp3", "wav", "ogg", "m4a", "flac"]
        .into_iter()
        .map(String::from)
        .collect()
}
