//! Authentication service - Logins and session tokens.
//!
//! Credentials are checked against the stored SHA-256 digest. Accounts
//! imported with a plain-text password are upgraded to the digest on their
//! first successful login.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{hash_password, Password, Role, User, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::{bounded, UnitOfWork};
use crate::with_transaction;

/// Session token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub role: Option<Role>,
    pub admin: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Returned after a successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Signed session token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 28800)]
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials (username or email) and open a session
    async fn login(&self, identifier: String, password: String) -> AppResult<TokenResponse>;

    /// Verify a session token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Sign a session token for a user
pub fn issue_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.session_expiration_hours);

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role,
        admin: user.has_admin_rights(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.session_expiration_hours * SECONDS_PER_HOUR,
        user: UserResponse::from(user.clone()),
    })
}

/// Verify a session token against the configured secret
pub fn verify_token(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.session_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, identifier: String, password: String) -> AppResult<TokenResponse> {
        let users = self.uow.users();
        let found = bounded(
            self.config.query_timeout,
            "looking up login",
            users.find_by_login(&identifier),
        )
        .await?;

        // Hash even when the account is missing so response time does not
        // reveal which identifiers exist.
        let stored = Password::from_hash(
            found
                .as_ref()
                .map(|u| u.password_hash.clone())
                .unwrap_or_default(),
        );
        let digest_matches = stored.verify(&password);

        let user = match found {
            Some(user) if user.active => user,
            Some(user) => {
                tracing::warn!(user_id = user.id, "Login attempt on inactive account");
                return Err(AppError::InvalidCredentials);
            }
            None => {
                tracing::warn!(%identifier, "Login attempt for unknown account");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !digest_matches {
            if !stored.is_legacy_plain_text(&password) {
                tracing::warn!(user_id = user.id, "Login failed: wrong password");
                return Err(AppError::InvalidCredentials);
            }

            let id = user.id;
            let digest = hash_password(&password);
            bounded(
                self.config.query_timeout,
                "upgrading stored password",
                async {
                    with_transaction!(self.uow, |ctx| ctx.users().set_password_hash(id, digest).await)
                },
            )
            .await?;
            tracing::info!(user_id = id, "Upgraded plain-text password to digest");
        }

        tracing::info!(user_id = user.id, username = %user.username, "Login succeeded");
        issue_token(&user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token(token, &self.config)
    }
}
