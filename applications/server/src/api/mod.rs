/// API route modules
pub mod auth;
pub mod extract;
pub mod feedback;
pub mod genres;
pub mod health;
pub mod multipart;
pub mod playlists;
pub mod tracks;
pub mod users;

use crate::{error::Result, middleware::auth_middleware, state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use tower_http::services::ServeDir;
use tune_core::pagination::{PageRequest, DEFAULT_PAGE_SIZE};

/// `page`/`size` query parameters shared by list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn to_request(&self) -> Result<PageRequest> {
        page_request(self.page, self.size)
    }
}

/// Validated page request from optional query values
pub fn page_request(page: Option<u32>, size: Option<u32>) -> Result<PageRequest> {
    Ok(PageRequest::new(
        page.unwrap_or(1),
        size.unwrap_or(DEFAULT_PAGE_SIZE),
    )?)
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.file_storage.uploads().max_request_bytes());

    let api = Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        // Users
        .route("/users/me", get(users::me).put(users::update_me))
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Tracks
        .route(
            "/tracks",
            get(tracks::list_tracks)
                .post(tracks::create_track)
                .layer(upload_limit.clone()),
        )
        .route(
            "/tracks/:id",
            get(tracks::get_track).delete(tracks::delete_track),
        )
        .route("/genres", get(genres::list_genres))
        // Playlists
        .route(
            "/playlists",
            get(playlists::list_playlists).post(playlists::create_playlist),
        )
        .route(
            "/playlists/:id",
            get(playlists::get_playlist)
                .put(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route(
            "/playlists/:id/cover",
            put(playlists::upload_cover).layer(upload_limit),
        )
        .route("/playlists/:id/tracks", post(playlists::add_track))
        .route(
            "/playlists/:id/tracks/:track_id",
            put(playlists::move_track).delete(playlists::remove_track),
        )
        // Favorites and dislikes
        .route("/favorites", get(feedback::list_favorites))
        .route(
            "/favorites/:track_id",
            post(feedback::add_favorite).delete(feedback::remove_favorite),
        )
        .route("/dislikes", get(feedback::list_dislikes))
        .route(
            "/dislikes/:track_id",
            post(feedback::add_dislike).delete(feedback::remove_dislike),
        )
        // Reviews
        .route(
            "/reviews",
            get(feedback::list_reviews).post(feedback::create_review),
        )
        .route(
            "/reviews/:id",
            get(feedback::get_review)
                .put(feedback::update_review)
                .delete(feedback::delete_review),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .nest_service("/media", ServeDir::new(state.file_storage.media_root()))
        .with_state(state)
}
