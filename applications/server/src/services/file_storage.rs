/// File storage service - manages uploaded covers and audio on disk
use crate::{
    config::UploadSettings,
    error::{Result, ServerError},
};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// URL prefix under which the media root is served
pub const MEDIA_URL_PREFIX: &str = "/media";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Cover,
    Track,
}

impl MediaKind {
    pub fn subdirectory(self) -> &'static str {
        match self {
            MediaKind::Cover => "covers",
            MediaKind::Track => "tracks",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MediaKind::Cover => "cover",
            MediaKind::Track => "audio",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    media_root: PathBuf,
    uploads: UploadSettings,
}

impl FileStorage {
    pub fn new(media_root: PathBuf, uploads: UploadSettings) -> Self {
        Self { media_root, uploads }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    pub fn uploads(&self) -> &UploadSettings {
        &self.uploads
    }

    /// Initialize storage directories
    pub async fn initialize(&self) -> Result<()> {
        for kind in [MediaKind::Cover, MediaKind::Track] {
            fs::create_dir_all(self.media_root.join(kind.subdirectory())).await?;
        }
        Ok(())
    }

    /// Check an uploaded file against the allow-list and size limit
    ///
    /// Returns the lowercased extension to store the file under.
    pub fn validate_upload(&self, kind: MediaKind, filename: &str, size: usize) -> Result<String> {
        let (allowed, max_bytes, max_mb) = match kind {
            MediaKind::Cover => (
                &self.uploads.cover_extensions,
                self.uploads.max_cover_bytes(),
                self.uploads.max_cover_size_mb,
            ),
            MediaKind::Track => (
                &self.uploads.track_extensions,
                self.uploads.max_track_bytes(),
                self.uploads.max_track_size_mb,
            ),
        };

        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if !allowed.iter().any(|ext| ext.eq_ignore_ascii_case(&extension)) {
            return Err(ServerError::BadRequest(format!(
                "Invalid {} file format. Allowed: {}",
                kind.label(),
                allowed.join(", ")
            )));
        }

        if size == 0 {
            return Err(ServerError::BadRequest(format!(
                "Empty {} file",
                kind.label()
            )));
        }

        if size > max_bytes {
            return Err(ServerError::BadRequest(format!(
                "{} file too large. Maximum size: {}MB",
                capitalize(kind.label()),
                max_mb
            )));
        }

        Ok(extension)
    }

    /// Write a file under a fresh name and return its `/media/...` path
    pub async fn store(&self, kind: MediaKind, extension: &str, data: &[u8]) -> Result<String> {
        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        let dir = self.media_root.join(kind.subdirectory());
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&filename), data).await?;

        tracing::debug!("Stored {} file {}", kind.label(), filename);
        Ok(format!(
            "{MEDIA_URL_PREFIX}/{}/{filename}",
            kind.subdirectory()
        ))
    }

    /// Remove a previously stored file; a missing file is not an error
    pub async fn delete(&self, media_path: &str) -> Result<()> {
        let path = self.resolve(media_path)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort cleanup used after the catalog no longer references a file
    pub async fn discard(&self, media_path: &str) {
        if let Err(e) = self.delete(media_path).await {
            tracing::warn!("Failed to remove media file {}: {}", media_path, e);
        }
    }

    /// Map a `/media/...` path to a file under the media root
    pub fn resolve(&self, media_path: &str) -> Result<PathBuf> {
        let relative = media_path
            .strip_prefix(MEDIA_URL_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ServerError::BadRequest(format!("Not a media path: {media_path}")))?;

        let relative = Path::new(relative);
        if relative.as_os_str().is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ServerError::Forbidden(
                "Path traversal attempt detected".to_string(),
            ));
        }

        Ok(self.media_root.join(relative))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
