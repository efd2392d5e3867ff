/// User API routes
use crate::{
    api::{
        auth::{validate_email, validate_password},
        extract::ApiJson,
    },
    error::{Result, ServerError},
    middleware::{AdminUser, AuthenticatedUser},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tune_core::{UpdateUser, User, UserId};

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// GET /api/v1/users/me
pub async fn me(State(app_state): State<AppState>, auth: AuthenticatedUser) -> Result<Json<User>> {
    Ok(Json(load_user(&app_state, auth.user_id).await?))
}

/// PUT /api/v1/users/me
pub async fn update_me(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    apply_update(&app_state, auth.user_id, req).await.map(Json)
}

/// GET /api/v1/users (admin)
pub async fn list_users(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<User>>> {
    if query.skip < 0 || query.limit < 1 {
        return Err(ServerError::Validation(
            "skip must be >= 0 and limit >= 1".to_string(),
        ));
    }
    let users = app_state.db.list_users(query.skip, query.limit).await?;
    Ok(Json(users))
}

/// GET /api/v1/users/:id (admin)
pub async fn get_user(
    Path(id): Path<UserId>,
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<User>> {
    Ok(Json(load_user(&app_state, id).await?))
}

/// PUT /api/v1/users/:id (admin)
pub async fn update_user(
    Path(id): Path<UserId>,
    State(app_state): State<AppState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    apply_update(&app_state, id, req).await.map(Json)
}

/// DELETE /api/v1/users/:id (admin)
pub async fn delete_user(
    Path(id): Path<UserId>,
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<StatusCode> {
    if admin.user_id == id {
        return Err(ServerError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    app_state.db.delete_user(id).await?;
    tracing::info!("User {} deleted by admin {}", id, admin.user_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn load_user(app_state: &AppState, id: UserId) -> Result<User> {
    app_state
        .db
        .get_user(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))
}

async fn apply_update(app_state: &AppState, id: UserId, req: UpdateUserRequest) -> Result<User> {
    if let Some(username) = &req.username {
        if username.trim().is_empty() {
            return Err(ServerError::Validation("Username is required".to_string()));
        }
    }
    if let Some(email) = &req.email {
        validate_email(email)?;
    }

    let password_hash = match &req.password {
        Some(password) => {
            validate_password(password)?;
            Some(app_state.auth_service.hash_password(password)?)
        }
        None => None,
    };

    let user = app_state
        .db
        .update_user(
            id,
            UpdateUser {
                username: req.username.map(|u| u.trim().to_string()),
                email: req.email,
                display_name: req.display_name,
                password_hash,
            },
        )
        .await?;

    Ok(user)
}
