use axum::response::Json;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::domain::{validate_password, PasswordReport};

/// Password to check. An empty string is a valid request with an invalid
/// password; a missing field is a bad request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordCheckRequest {
    #[schema(example = "Juzg4do#Seguro")]
    pub password: String,
}

/// Score a password against the strength rules
#[utoipa::path(
    post,
    path = "/api/validate-password",
    tag = "Authentication",
    request_body = PasswordCheckRequest,
    responses(
        (status = 200, description = "Strength report", body = PasswordReport),
        (status = 400, description = "Missing or malformed password field")
    )
)]
pub async fn validate_password_strength(
    ValidatedJson(payload): ValidatedJson<PasswordCheckRequest>,
) -> Json<PasswordReport> {
    Json(validate_password(&payload.password))
}
