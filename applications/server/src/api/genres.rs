/// Genre API routes
use axum::Json;
use serde::Serialize;
use tune_core::Genre;

#[derive(Debug, Serialize)]
pub struct GenreResponse {
    pub value: &'static str,
    pub name: &'static str,
}

/// GET /api/v1/genres
pub async fn list_genres() -> Json<Vec<GenreResponse>> {
    Json(
        Genre::ALL
            .iter()
            .map(|genre| GenreResponse {
                value: genre.as_str(),
                name: genre.as_str(),
            })
            .collect(),
    )
}
