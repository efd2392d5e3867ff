/// Password hashing and bearer token issuance
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tune_core::UserId;

/// Which of the two token flavours a JWT is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload; `sub` is the decimal user id
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    exp: i64,
    iat: i64,
    token_type: TokenKind,
}

/// Signs and checks HS256 tokens and hashes passwords with bcrypt
///
/// Keys are derived from the secret once, at construction.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    bcrypt_cost: u32,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(secret: String, access_ttl_hours: u64, refresh_ttl_days: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::hours(access_ttl_hours as i64),
            refresh_ttl: Duration::days(refresh_ttl_days as i64),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor (tests use the minimum)
    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        Ok(bcrypt::hash(password, self.bcrypt_cost)?)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        Ok(bcrypt::verify(password, hash)?)
    }

    pub fn create_access_token(&self, user_id: UserId) -> Result<String> {
        self.issue(user_id, TokenKind::Access)
    }

    pub fn create_refresh_token(&self, user_id: UserId) -> Result<String> {
        self.issue(user_id, TokenKind::Refresh)
    }

    /// User behind a bearer credential; refresh tokens are refused
    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        self.subject(token, TokenKind::Access)
    }

    /// User behind a refresh token; access tokens are refused
    pub fn verify_refresh_token(&self, token: &str) -> Result<UserId> {
        self.subject(token, TokenKind::Refresh)
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn issue(&self, user_id: UserId, kind: TokenKind) -> Result<String> {
        let issued_at = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp: (issued_at + self.ttl(kind)).timestamp(),
            iat: issued_at.timestamp(),
            token_type: kind,
        };

        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding_key,
        )?)
    }

    fn subject(&self, token: &str, expected: TokenKind) -> Result<UserId> {
        let claims =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &Validation::default())?
                .claims;

        if claims.token_type != expected {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }

        claims
            .sub
            .parse()
            .map_err(|_| ServerError::Auth("Could not validate credentials".to_string()))
    }
}
