//! Session gate middleware.
//!
//! Protected routers are wrapped with [`session_gate`]; admin routers add
//! [`require_admin`] inside it. A rejected request never reaches the handler.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, SESSION_COOKIE_NAME};
use crate::domain::Role;
use crate::errors::AppError;
use crate::services::Claims;

/// Identity of the signed-in user, available to handlers behind the gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub role: Option<Role>,
    pub is_admin: bool,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            is_admin: claims.admin,
        }
    }
}

/// Token from `Authorization: Bearer`, else from the session cookie.
fn session_token(request: &Request, jar: &CookieJar) -> Option<String> {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::to_string);

    bearer.or_else(|| jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string()))
}

/// Verify the session token and inject [`CurrentUser`] into the request.
pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&request, &jar).ok_or(AppError::Unauthorized)?;
    let claims = state.auth_service.verify_token(&token)?;

    request.extensions_mut().insert(CurrentUser::from(claims));

    Ok(next.run(request).await)
}

/// Reject users without admin rights. Must run inside [`session_gate`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;

    if !user.is_admin {
        tracing::warn!(user_id = user.id, path = %request.uri().path(), "Admin route denied");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
