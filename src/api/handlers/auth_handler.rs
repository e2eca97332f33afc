//! Authentication handlers.

use axum::{
    extract::State, middleware, response::Json, routing::post, Extension, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{login_rate_limit, ClientAddress, CurrentUser};
use crate::api::AppState;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::UserResponse;
use crate::errors::{AppError, AppResult};
use crate::services::TokenResponse;
use crate::types::MessageResponse;

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1, max = 254, message = "Username or email is required"))]
    #[schema(example = "lgomez", max_length = 254)]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    #[schema(example = "Juzg4do#Seguro", max_length = 128)]
    pub password: String,
}

/// Public login/logout routes. Only login is throttled.
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/login", post(login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    Router::new().merge(login).route("/logout", post(logout))
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Login and open a session
///
/// The token is returned in the body and set as an HttpOnly cookie. Repeated
/// failures lock the username and block the client address for a while.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials or inactive account"),
        (status = 429, description = "Too many attempts; see Retry-After")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(ClientAddress(address)): Extension<ClientAddress>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<TokenResponse>)> {
    let username = payload.username.trim().to_string();
    state.login_throttle.check_user(&username)?;

    let token = match state
        .auth_service
        .login(username.clone(), payload.password)
        .await
    {
        Ok(token) => token,
        Err(AppError::InvalidCredentials) => {
            state.login_throttle.record_failure(&address, &username);
            return Err(AppError::InvalidCredentials);
        }
        Err(e) => return Err(e),
    };
    state.login_throttle.record_success(&username);

    let jar = jar.add(session_cookie(token.access_token.clone()));
    Ok((jar, Json(token)))
}

/// Close the session by clearing the cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Session cookie cleared", body = MessageResponse))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"));
    (jar, Json(MessageResponse::new("Logged out")))
}

/// Current session user
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Signed-in user", body = UserResponse),
        (status = 401, description = "No valid session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(current.id).await?;
    Ok(Json(UserResponse::from(user)))
}
