/// Authentication API routes
use crate::{
    api::extract::{ApiJson, JsonOrForm},
    error::{Result, ServerError},
    state::AppState,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tune_core::{CreateUser, User, UserRole};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<User>> {
    let username = req.username.trim().to_string();
    if username.is_empty() {
        return Err(ServerError::Validation("Username is required".to_string()));
    }
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let password_hash = app_state.auth_service.hash_password(&req.password)?;
    let display_name = req
        .display_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| username.clone());

    let user = app_state
        .db
        .create_user(CreateUser {
            username,
            email: req.email,
            password_hash,
            display_name: Some(display_name),
            role: UserRole::User,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.username, user.id);
    Ok(Json(user))
}

/// POST /api/v1/auth/login
///
/// Credentials come as JSON or as a password-grant form body.
pub async fn login(
    State(app_state): State<AppState>,
    JsonOrForm(req): JsonOrForm<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let invalid = || ServerError::Auth("Incorrect username or password".to_string());

    let (user, password_hash) = app_state
        .db
        .find_credentials(&req.username)
        .await?
        .ok_or_else(invalid)?;

    if !app_state
        .auth_service
        .verify_password(&req.password, &password_hash)?
    {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(ServerError::BadRequest("Inactive user".to_string()));
    }

    Ok(Json(TokenResponse {
        access_token: app_state.auth_service.create_access_token(user.id)?,
        refresh_token: app_state.auth_service.create_refresh_token(user.id)?,
        token_type: "bearer",
    }))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<TokenResponse>> {
    let user_id = app_state
        .auth_service
        .verify_refresh_token(&req.refresh_token)
        .map_err(|_| ServerError::Auth("Could not validate credentials".to_string()))?;

    let user = app_state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| ServerError::Auth("Could not validate credentials".to_string()))?;

    if !user.is_active {
        return Err(ServerError::BadRequest("Inactive user".to_string()));
    }

    Ok(Json(TokenResponse {
        access_token: app_state.auth_service.create_access_token(user.id)?,
        refresh_token: app_state.auth_service.create_refresh_token(user.id)?,
        token_type: "bearer",
    }))
}

pub(crate) fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServerError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Loose shape check: one `@` with a dotted domain after it
pub(crate) fn validate_email(email: &str) -> Result<()> {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .split_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            && !email.contains(char::is_whitespace)
    });

    if valid {
        Ok(())
    } else {
        Err(ServerError::Validation(
            "Invalid email address".to_string(),
        ))
    }
}
