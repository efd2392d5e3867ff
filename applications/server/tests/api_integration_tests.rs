/// API integration tests
/// Drive the full router against an on-disk database and media root
mod common;

use axum::http::{header, Method, StatusCode};
use common::{request, track_order, MultipartBody, TestApp, TEST_PASSWORD};
use serde_json::json;
use tower::util::ServiceExt;
use tune_core::UserRole;

// ===== Health and genres =====

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_genres_list_fixed_set() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/v1/genres", None).await;

    assert_eq!(status, StatusCode::OK);
    let values: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, ["Pop", "Hip-Hop", "Ambient", "Indie", "Lo-Fi"]);
}

// ===== Authentication =====

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new().await;

    let (status, user) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "ada", "email": "ada@example.com", "password": "lovelace1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "ada");
    assert_eq!(user["display_name"], "ada");
    assert_eq!(user["role"], "user");
    assert_eq!(user["is_active"], true);

    let (status, tokens) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "ada", "password": "lovelace1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tokens["token_type"], "bearer");
    let access = tokens["access_token"].as_str().unwrap();

    let (status, me) = app.get("/api/v1/users/me", Some(access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");

    // Refresh yields a working access token
    let (status, refreshed) = app
        .post(
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh_token": tokens["refresh_token"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .get(
            "/api/v1/users/me",
            Some(refreshed["access_token"].as_str().unwrap()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_validation_and_conflicts() {
    let app = TestApp::new().await;
    app.user("taken", UserRole::User).await;

    let (status, _) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "short", "email": "s@example.com", "password": "1234567" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "bademail", "email": "nope", "password": "12345678" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "taken", "email": "new@example.com", "password": "12345678" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Username already registered");

    let (status, _) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "fresh", "email": "taken@example.com", "password": "12345678" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = TestApp::new().await;
    app.user("ada", UserRole::User).await;

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "ada", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "ghost", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_accepts_password_grant_form() {
    let app = TestApp::new().await;
    app.user("ada", UserRole::User).await;

    let form = |password: &str| {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(axum::body::Body::from(format!(
                "grant_type=password&username=ada&password={password}"
            )))
            .unwrap()
    };

    let (status, tokens) = app.send(form(TEST_PASSWORD)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tokens["token_type"], "bearer");
    let (status, _) = app
        .get("/api/v1/users/me", tokens["access_token"].as_str())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(form("wrong-password")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unreadable_bodies_use_detail_errors() {
    let app = TestApp::new().await;

    let malformed = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"username\": "))
        .unwrap();
    let (status, body) = app.send(malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = app
        .post("/api/v1/auth/register", None, json!({ "username": "ada" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_invalid_and_missing_tokens() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/v1/users/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/api/v1/tracks", Some("garbage"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

    // Refresh tokens are not accepted as bearer credentials
    let (id, _) = app.user("ada", UserRole::User).await;
    let refresh = app.auth.create_refresh_token(id).unwrap();
    let (status, _) = app.get("/api/v1/users/me", Some(&refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_and_inactive_users_are_rejected() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("root", UserRole::Admin).await;
    let (gone_id, gone_token) = app.user("gone", UserRole::User).await;
    let (idle_id, idle_token) = app.user("idle", UserRole::User).await;

    let (status, _) = app
        .delete(&format!("/api/v1/users/{gone_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get("/api/v1/users/me", Some(&gone_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
        .bind(idle_id.get())
        .execute(app.db.pool())
        .await
        .unwrap();
    let (status, body) = app.get("/api/v1/users/me", Some(&idle_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Inactive user");
}

// ===== Users =====

#[tokio::test]
async fn test_user_admin_routes() {
    let app = TestApp::new().await;
    let (admin_id, admin) = app.user("root", UserRole::Admin).await;
    let (user_id, user) = app.user("ada", UserRole::User).await;

    let (status, _) = app.get("/api/v1/users", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) = app.get("/api/v1/users?skip=0&limit=10", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, updated) = app
        .put(
            &format!("/api/v1/users/{user_id}"),
            Some(&admin),
            json!({ "display_name": "Ada L." }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["display_name"], "Ada L.");

    let (status, _) = app
        .delete(&format!("/api/v1/users/{admin_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/v1/users/9999", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_me_changes_password() {
    let app = TestApp::new().await;
    let (_, token) = app.user("ada", UserRole::User).await;
    app.user("grace", UserRole::User).await;

    let (status, _) = app
        .put(
            "/api/v1/users/me",
            Some(&token),
            json!({ "username": "grace" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .put(
            "/api/v1/users/me",
            Some(&token),
            json!({ "password": "a-new-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "ada", "password": "a-new-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

// ===== Tracks =====

#[tokio::test]
async fn test_upload_requires_admin() {
    let app = TestApp::new().await;
    let (_, user) = app.user("ada", UserRole::User).await;

    let body = MultipartBody::new()
        .text("title", "Song")
        .text("artist", "Artist")
        .text("genre", "Pop")
        .text("duration", "120")
        .file("cover", "c.png", b"img")
        .file("audio", "a.mp3", b"snd");
    let (status, _) = app
        .send(body.request(Method::POST, "/api/v1/tracks", Some(&user)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_upload_stores_media_and_normalizes_genre() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("root", UserRole::Admin).await;

    let id = app.upload_track(&admin, "Night Drive", "lo-fi").await;

    let (status, track) = app.get(&format!("/api/v1/tracks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(track["genre"], "Lo-Fi");
    assert_eq!(track["duration"], 185.5);
    assert_eq!(track["favorites_count"], 0);
    assert!(track["is_favorited"].is_null());

    let cover = track["cover_path"].as_str().unwrap();
    let audio = track["audio_path"].as_str().unwrap();
    assert!(cover.starts_with("/media/covers/"));
    assert!(audio.starts_with("/media/tracks/"));
    assert!(app.storage.resolve(cover).unwrap().exists());
    assert!(app.storage.resolve(audio).unwrap().exists());

    // Served from the media root
    let (status, _) = app
        .send(request(Method::GET, audio, None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_rejections() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("root", UserRole::Admin).await;

    let upload = |genre: &'static str, duration: &'static str, audio_name: &'static str| {
        MultipartBody::new()
            .text("title", "Song")
            .text("artist", "Artist")
            .text("genre", genre)
            .text("duration", duration)
            .file("cover", "c.png", b"img")
            .file("audio", audio_name, b"snd")
            .request(Method::POST, "/api/v1/tracks", Some(&admin))
    };

    let (status, _) = app.send(upload("Metal", "120", "a.mp3")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(upload("Pop", "120", "a.exe")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(upload("Pop", "0", "a.mp3")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.send(upload("Pop", "abc", "a.mp3")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was written for the rejected uploads
    let mut covers = tokio::fs::read_dir(app.storage.media_root().join("covers"))
        .await
        .unwrap();
    assert!(covers.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn test_upload_size_limit() {
    let uploads = tune_server::config::UploadSettings {
        max_track_size_mb: 1,
        ..Default::default()
    };
    let app = TestApp::with_uploads(uploads).await;
    let (_, admin) = app.user("root", UserRole::Admin).await;

    let big = vec![0u8; 1024 * 1024 + 1];
    let body = MultipartBody::new()
        .text("title", "Huge")
        .text("artist", "Artist")
        .text("genre", "Pop")
        .text("duration", "120")
        .file("cover", "c.png", b"img")
        .file("audio", "a.wav", &big);
    let (status, body) = app
        .send(body.request(Method::POST, "/api/v1/tracks", Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_track_list_filters_and_pagination() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("root", UserRole::Admin).await;

    app.upload_track(&admin, "Sunrise", "Ambient").await;
    app.upload_track(&admin, "Block Party", "Hip-Hop").await;
    app.upload_track(&admin, "Sunset", "Ambient").await;

    let (status, page) = app.get("/api/v1/tracks?genre=ambient", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);

    let (_, page) = app.get("/api/v1/tracks?search=sun", None).await;
    assert_eq!(page["total"], 2);

    let (_, page) = app.get("/api/v1/tracks?genre=Metal", None).await;
    assert_eq!(page["total"], 0);
    assert_eq!(page["items"].as_array().unwrap().len(), 0);

    let (_, page) = app.get("/api/v1/tracks?page=2&size=2", None).await;
    assert_eq!(page["total"], 3);
    assert_eq!(page["pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let (status, _) = app.get("/api/v1/tracks?size=101", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = app.get("/api/v1/tracks?page=0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_track_is_404() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/v1/tracks/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());
}

// ===== Playlist ordering =====

#[tokio::test]
async fn test_playlist_ordering_scenario() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("root", UserRole::Admin).await;
    let (_, owner) = app.user("ada", UserRole::User).await;

    let a = app.upload_track(&admin, "A", "Pop").await;
    let b = app.upload_track(&admin, "B", "Pop").await;
    let c = app.upload_track(&admin, "C", "Pop").await;
    let d = app.upload_track(&admin, "D", "Pop").await;
    let playlist = app.create_playlist(&owner, "Mix", true).await;
    let tracks_uri = format!("/api/v1/playlists/{playlist}/tracks");

    for track in [a, b, c] {
        let (status, _) = app
            .post(&tracks_uri, Some(&owner), json!({ "track_id": track }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app
        .put(
            &format!("{tracks_uri}/{b}"),
            Some(&owner),
            json!({ "position": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(track_order(&body), [b, a, c]);

    let (status, body) = app.delete(&format!("{tracks_uri}/{a}"), Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(track_order(&body), [b, c]);

    let (status, body) = app
        .post(
            &tracks_uri,
            Some(&owner),
            json!({ "track_id": d, "position": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(track_order(&body), [d, b, c]);

    let (status, body) = app
        .get(&format!("/api/v1/playlists/{playlist}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(track_order(&body), [d, b, c]);
}

#[tokio::test]
async fn test_playlist_entry_errors() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("root", UserRole::Admin).await;
    let (_, owner) = app.user("ada", UserRole::User).await;
    let (_, other) = app.user("eve", UserRole::User).await;

    let a = app.upload_track(&admin, "A", "Indie").await;
    let b = app.upload_track(&admin, "B", "Indie").await;
    let playlist = app.create_playlist(&owner, "Mix", true).await;
    let tracks_uri = format!("/api/v1/playlists/{playlist}/tracks");
    app.post(&tracks_uri, Some(&owner), json!({ "track_id": a }))
        .await;

    // Duplicate member
    let (status, _) = app
        .post(&tracks_uri, Some(&owner), json!({ "track_id": a }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Out of range insert position is rejected, not clamped
    let (status, _) = app
        .post(
            &tracks_uri,
            Some(&owner),
            json!({ "track_id": b, "position": 5 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown track
    let (status, _) = app
        .post(&tracks_uri, Some(&owner), json!({ "track_id": 9999 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Not the owner
    let (status, _) = app
        .post(&tracks_uri, Some(&other), json!({ "track_id": b }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Anonymous callers cannot mutate
    let (status, _) = app
        .post(&tracks_uri, None, json!({ "track_id": b }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Move out of range and move of a non-member
    let (status, _) = app
        .put(&format!("{tracks_uri}/{a}"), Some(&owner), json!({ "position": 2 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = app
        .put(&format!("{tracks_uri}/{b}"), Some(&owner), json!({ "position": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Remove of a non-member
    let (status, _) = app.delete(&format!("{tracks_uri}/{b}"), Some(&owner)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Only the owner may remove entries
    let (status, body) = app.delete(&format!("{tracks_uri}/{a}"), Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["detail"].is_string());

    // Malformed positions answer with a detail body like every other error
    for position in [json!(1.5), json!("first")] {
        let (status, body) = app
            .put(&format!("{tracks_uri}/{a}"), Some(&owner), json!({ "position": position }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string(), "no detail for {position}");

        let (status, body) = app
            .post(&tracks_uri, Some(&owner), json!({ "track_id": b, "position": position }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    // Unknown playlist
    let (status, _) = app
        .post("/api/v1/playlists/9999/tracks", Some(&owner), json!({ "track_id": a }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // None of the rejections touched the order
    let (_, body) = app
        .get(&format!("/api/v1/playlists/{playlist}"), Some(&owner))
        .await;
    assert_eq!(track_order(&body), [a]);
}

#[tokio::test]
async fn test_deleting_track_closes_playlist_gaps() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("root", UserRole::Admin).await;
    let (_, owner) = app.user("ada", UserRole::User).await;

    let a = app.upload_track(&admin, "A", "Pop").await;
    let b = app.upload_track(&admin, "B", "Pop").await;
    let c = app.upload_track(&admin, "C", "Pop").await;
    let playlist = app.create_playlist(&owner, "Mix", false).await;
    let tracks_uri = format!("/api/v1/playlists/{playlist}/tracks");
    for track in [a, b, c] {
        app.post(&tracks_uri, Some(&owner), json!({ "track_id": track }))
            .await;
    }

    let (_, track) = app.get(&format!("/api/v1/tracks/{b}"), None).await;
    let audio = app
        .storage
        .resolve(track["audio_path"].as_str().unwrap())
        .unwrap();

    let (status, _) = app.delete(&format!("/api/v1/tracks/{b}"), Some(&owner)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&format!("/api/v1/tracks/{b}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!audio.exists());

    let (_, body) = app
        .get(&format!("/api/v1/playlists/{playlist}"), Some(&owner))
        .await;
    assert_eq!(track_order(&body), [a, c]);

    let (status, _) = app.delete(&format!("/api/v1/tracks/{b}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ===== Playlist management =====

#[tokio::test]
async fn test_private_playlist_visibility() {
    let app = TestApp::new().await;
    let (_, owner) = app.user("ada", UserRole::User).await;
    let (_, other) = app.user("eve", UserRole::User).await;

    let private = app.create_playlist(&owner, "Secret", false).await;
    let public = app.create_playlist(&owner, "Shared", true).await;

    let (status, body) = app
        .get(&format!("/api/v1/playlists/{private}"), Some(&other))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Playlist is private");

    let (status, _) = app.get(&format!("/api/v1/playlists/{private}"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/api/v1/playlists/{public}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .get(&format!("/api/v1/playlists/{private}"), Some(&owner))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Listing: others see only the public one, the owner sees both
    let (_, page) = app.get("/api/v1/playlists", Some(&other)).await;
    assert_eq!(page["total"], 1);
    let (_, page) = app.get("/api/v1/playlists", Some(&owner)).await;
    assert_eq!(page["total"], 2);
    let (_, page) = app.get("/api/v1/playlists?is_public=false", Some(&owner)).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Secret");

    let (status, _) = app.get("/api/v1/playlists", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_playlist_update_and_delete() {
    let app = TestApp::new().await;
    let (_, owner) = app.user("ada", UserRole::User).await;
    let (_, other) = app.user("eve", UserRole::User).await;
    let playlist = app.create_playlist(&owner, "Mix", true).await;
    let uri = format!("/api/v1/playlists/{playlist}");

    let (status, _) = app.put(&uri, Some(&owner), json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.put(&uri, Some(&other), json!({ "name": "Mine" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .put(
            &uri,
            Some(&owner),
            json!({ "description": "Late night", "is_public": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Mix");
    assert_eq!(updated["description"], "Late night");
    assert_eq!(updated["is_public"], false);

    let (status, _) = app.delete(&uri, Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, Some(&owner)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&uri, Some(&owner)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_playlist_cover_replaces_previous_file() {
    let app = TestApp::new().await;
    let (_, owner) = app.user("ada", UserRole::User).await;
    let (_, other) = app.user("eve", UserRole::User).await;
    let playlist = app.create_playlist(&owner, "Mix", true).await;
    let uri = format!("/api/v1/playlists/{playlist}/cover");

    let upload = |token: &str| {
        MultipartBody::new()
            .file("cover", "cover.jpg", b"jpeg")
            .request(Method::PUT, &uri, Some(token))
    };

    let (status, _) = app.send(upload(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, first) = app.send(upload(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    let first_path = app
        .storage
        .resolve(first["cover_path"].as_str().unwrap())
        .unwrap();
    assert!(first_path.exists());

    let (status, second) = app.send(upload(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(first["cover_path"], second["cover_path"]);
    assert!(!first_path.exists());
}

// ===== Favorites, dislikes, reviews =====

#[tokio::test]
async fn test_favorite_and_dislike_are_exclusive() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("root", UserRole::Admin).await;
    let (_, user) = app.user("ada", UserRole::User).await;
    let track = app.upload_track(&admin, "Song", "Pop").await;

    let (status, first) = app
        .post(&format!("/api/v1/favorites/{track}"), Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Idempotent
    let (status, again) = app
        .post(&format!("/api/v1/favorites/{track}"), Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], again["id"]);

    let (_, stats) = app.get(&format!("/api/v1/tracks/{track}"), Some(&user)).await;
    assert_eq!(stats["favorites_count"], 1);
    assert_eq!(stats["is_favorited"], true);
    assert_eq!(stats["is_disliked"], false);

    let (status, _) = app
        .post(&format!("/api/v1/dislikes/{track}"), Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, favorites) = app.get("/api/v1/favorites", Some(&user)).await;
    assert_eq!(favorites["total"], 0);
    let (_, dislikes) = app.get("/api/v1/dislikes", Some(&user)).await;
    assert_eq!(dislikes["total"], 1);
    assert_eq!(dislikes["items"][0]["track"]["title"], "Song");

    let (status, _) = app
        .delete(&format!("/api/v1/favorites/{track}"), Some(&user))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .delete(&format!("/api/v1/dislikes/{track}"), Some(&user))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .post("/api/v1/favorites/9999", Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_permissions() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("root", UserRole::Admin).await;
    let (author_id, author) = app.user("ada", UserRole::User).await;
    let (_, other) = app.user("eve", UserRole::User).await;
    let track = app.upload_track(&admin, "Song", "Indie").await;

    let (status, _) = app
        .post("/api/v1/reviews", Some(&author), json!({ "track_id": track, "text": "" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, review) = app
        .post(
            "/api/v1/reviews",
            Some(&author),
            json!({ "track_id": track, "text": "Great hook" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["user"]["username"], "ada");
    let review_uri = format!("/api/v1/reviews/{}", review["id"]);

    let (status, _) = app
        .post(
            "/api/v1/reviews",
            Some(&author),
            json!({ "track_id": track, "text": "Twice" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, page) = app
        .get(&format!("/api/v1/reviews?track_id={track}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    let (_, page) = app
        .get(&format!("/api/v1/reviews?user_id={author_id}"), None)
        .await;
    assert_eq!(page["total"], 1);

    let (status, _) = app
        .put(&review_uri, Some(&other), json!({ "text": "Hijacked" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, updated) = app
        .put(&review_uri, Some(&author), json!({ "text": "Great bridge" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["text"], "Great bridge");

    let (status, _) = app.delete(&review_uri, Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&review_uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&review_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
