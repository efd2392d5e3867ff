/// Authentication middleware
use crate::{error::ServerError, state::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tune_core::{UserId, UserRole};

/// Caller resolved from a bearer token
///
/// Inserted into request extensions by [`auth_middleware`]. Handlers take it
/// directly when a login is required, or as `Option<AuthenticatedUser>` when
/// anonymous access is allowed.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Authenticated caller with the admin role
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthenticatedUser);

/// Middleware that validates a bearer token when one is presented
///
/// Requests without an `Authorization` header pass through anonymously; a
/// header that does not resolve to an active user is rejected outright.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(auth_header) = request.headers().get(header::AUTHORIZATION) else {
        return Ok(next.run(request).await);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(credentials_error)?;

    let user_id = state.auth_service.verify_access_token(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        credentials_error()
    })?;

    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(credentials_error)?;

    if !user.is_active {
        return Err(ServerError::BadRequest("Inactive user".to_string()));
    }

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        role: user.role,
    });

    Ok(next.run(request).await)
}

fn credentials_error() -> ServerError {
    ServerError::Auth("Could not validate credentials".to_string())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| ServerError::Auth("Not authenticated".to_string()))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ServerError::Forbidden(
                "Not enough permissions".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}
