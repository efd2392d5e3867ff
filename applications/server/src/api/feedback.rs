/// Favorites, dislikes and reviews API routes
use crate::{
    api::{extract::ApiJson, page_request, PageQuery},
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tune_core::{
    Page, Reaction, ReactionWithTrack, ReviewFilter, ReviewId, ReviewWithUser, TrackId, UserId,
};

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub track_id: Option<TrackId>,
    pub user_id: Option<UserId>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub track_id: TrackId,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub text: String,
}

async fn list_reactions(
    app_state: &AppState,
    auth: AuthenticatedUser,
    query: &PageQuery,
    reaction: Reaction,
) -> Result<Json<Page<ReactionWithTrack>>> {
    let page = query.to_request()?;
    let items = app_state
        .db
        .list_reactions(auth.user_id, reaction, page)
        .await?;
    Ok(Json(items))
}

/// GET /api/v1/favorites
pub async fn list_favorites(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ReactionWithTrack>>> {
    list_reactions(&app_state, auth, &query, Reaction::Favorite).await
}

/// POST /api/v1/favorites/:track_id
pub async fn add_favorite(
    Path(track_id): Path<TrackId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<ReactionWithTrack>> {
    let favorite = app_state
        .db
        .add_reaction(auth.user_id, track_id, Reaction::Favorite)
        .await?;
    Ok(Json(favorite))
}

/// DELETE /api/v1/favorites/:track_id
pub async fn remove_favorite(
    Path(track_id): Path<TrackId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    app_state
        .db
        .remove_reaction(auth.user_id, track_id, Reaction::Favorite)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/dislikes
pub async fn list_dislikes(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ReactionWithTrack>>> {
    list_reactions(&app_state, auth, &query, Reaction::Dislike).await
}

/// POST /api/v1/dislikes/:track_id
pub async fn add_dislike(
    Path(track_id): Path<TrackId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<ReactionWithTrack>> {
    let dislike = app_state
        .db
        .add_reaction(auth.user_id, track_id, Reaction::Dislike)
        .await?;
    Ok(Json(dislike))
}

/// DELETE /api/v1/dislikes/:track_id
pub async fn remove_dislike(
    Path(track_id): Path<TrackId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    app_state
        .db
        .remove_reaction(auth.user_id, track_id, Reaction::Dislike)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/reviews
pub async fn list_reviews(
    State(app_state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Page<ReviewWithUser>>> {
    let page = page_request(query.page, query.size)?;
    let filter = ReviewFilter {
        track_id: query.track_id,
        user_id: query.user_id,
    };
    Ok(Json(app_state.db.list_reviews(filter, page).await?))
}

/// POST /api/v1/reviews
pub async fn create_review(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<CreateReviewRequest>,
) -> Result<Json<ReviewWithUser>> {
    let review = app_state
        .db
        .create_review(auth.user_id, req.track_id, review_text(&req.text)?)
        .await?;
    Ok(Json(review))
}

/// GET /api/v1/reviews/:id
pub async fn get_review(
    Path(id): Path<ReviewId>,
    State(app_state): State<AppState>,
) -> Result<Json<ReviewWithUser>> {
    Ok(Json(load_review(&app_state, id).await?))
}

/// PUT /api/v1/reviews/:id (author only)
pub async fn update_review(
    Path(id): Path<ReviewId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdateReviewRequest>,
) -> Result<Json<ReviewWithUser>> {
    let text = review_text(&req.text)?;
    let existing = load_review(&app_state, id).await?;
    if existing.review.user_id != auth.user_id {
        return Err(ServerError::Forbidden(
            "Not enough permissions".to_string(),
        ));
    }

    Ok(Json(app_state.db.update_review(id, text).await?))
}

/// DELETE /api/v1/reviews/:id (author or admin)
pub async fn delete_review(
    Path(id): Path<ReviewId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode> {
    let existing = load_review(&app_state, id).await?;
    if existing.review.user_id != auth.user_id && !auth.is_admin() {
        return Err(ServerError::Forbidden(
            "Not enough permissions".to_string(),
        ));
    }

    app_state.db.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_review(app_state: &AppState, id: ReviewId) -> Result<ReviewWithUser> {
    app_state
        .db
        .get_review(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Review not found".to_string()))
}

fn review_text(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ServerError::Validation(
            "Review text must not be empty".to_string(),
        ));
    }
    Ok(text.to_string())
}
