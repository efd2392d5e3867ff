//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use tune_core::{CatalogStore, CreateUser, UserId, UserRole};
use tune_server::{
    api,
    config::UploadSettings,
    services::{AuthService, FileStorage},
    state::AppState,
};
use tune_storage::Database;

pub const TEST_PASSWORD: &str = "correct-horse-battery";
pub const BOUNDARY: &str = "tune-test-boundary";

/// Router plus handles on everything behind it
pub struct TestApp {
    pub router: Router,
    pub db: Arc<Database>,
    pub auth: Arc<AuthService>,
    pub storage: Arc<FileStorage>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_uploads(UploadSettings::default()).await
    }

    pub async fn with_uploads(uploads: UploadSettings) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
        let db = Arc::new(Database::new(&db_url).await.unwrap());

        let storage = FileStorage::new(temp_dir.path().join("media"), uploads);
        storage.initialize().await.unwrap();
        let storage = Arc::new(storage);

        let auth = Arc::new(AuthService::new("test-secret-key".to_string(), 1, 1).with_bcrypt_cost(4));

        let state = AppState::new(db.clone(), Arc::clone(&auth), Arc::clone(&storage));

        Self {
            router: api::router(state),
            db,
            auth,
            storage,
            _temp_dir: temp_dir,
        }
    }

    /// Insert a user directly and return an access token for them
    pub async fn user(&self, username: &str, role: UserRole) -> (UserId, String) {
        let password_hash = self.auth.hash_password(TEST_PASSWORD).unwrap();
        let user = self
            .db
            .create_user(CreateUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash,
                display_name: None,
                role,
            })
            .await
            .unwrap();
        let token = self.auth.create_access_token(user.id).unwrap();
        (user.id, token)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PUT, uri, token, Some(body))).await
    }

    /// Upload a track as an admin, returning its id
    pub async fn upload_track(&self, admin_token: &str, title: &str, genre: &str) -> i64 {
        let body = MultipartBody::new()
            .text("title", title)
            .text("artist", "Test Artist")
            .text("genre", genre)
            .text("duration", "185.5")
            .file("cover", "cover.png", b"png-bytes")
            .file("audio", "song.mp3", b"mp3-bytes");
        let (status, track) = self
            .send(body.request(Method::POST, "/api/v1/tracks", Some(admin_token)))
            .await;
        assert_eq!(status, StatusCode::OK, "upload failed: {track}");
        track["id"].as_i64().unwrap()
    }

    pub async fn create_playlist(&self, token: &str, name: &str, is_public: bool) -> i64 {
        let (status, playlist) = self
            .post(
                "/api/v1/playlists",
                Some(token),
                serde_json::json!({ "name": name, "is_public": is_public }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        playlist["id"].as_i64().unwrap()
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Track ids of a playlist response in position order, checking positions
/// run 1..=N
pub fn track_order(playlist: &Value) -> Vec<i64> {
    let entries = playlist["tracks"].as_array().unwrap();
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            assert_eq!(entry["position"].as_i64().unwrap(), i as i64 + 1);
            entry["track"]["id"].as_i64().unwrap()
        })
        .collect()
}

/// Hand-built multipart/form-data body
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn request(mut self, method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(self.bytes)).unwrap()
    }
}
