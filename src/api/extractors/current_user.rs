use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::api::middleware::CurrentUser;
use crate::errors::AppError;

/// Handlers behind the session gate take `CurrentUser` as an argument.
/// Outside the gate the extension is absent and the request is rejected.
#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
