//! User administration handlers. Every route here is admin-only.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, patch, post, put},
    Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    BulkAssignmentResult, BulkRoleAssignment, CreateUser, RoleAssignment, RoleRecord, RoleStats,
    UpdateUser, UserList, UserResponse,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent};

/// User routes (mounted under `/api/users`)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", patch(update_user).delete(delete_user))
        .route("/:id/role", put(change_role))
        .route("/roles/bulk", post(assign_roles))
}

/// List accounts with statistics
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Accounts and counts", body = UserList),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Admin rights required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UserList>> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

/// Create an account
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation error or weak password"),
        (status = 409, description = "Username or email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateUser>,
) -> AppResult<Created<UserResponse>> {
    tracing::debug!(admin_id = current.id, username = %payload.username, "Creating user");
    let user = state.user_service.create_user(payload).await?;

    Ok(Created(ApiResponse::with_message(
        UserResponse::from(user),
        "User created",
    )))
}

/// Update an account; absent fields stay unchanged
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUser>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state.user_service.update_user(id, payload).await?;

    Ok(Json(ApiResponse::with_message(
        UserResponse::from(user),
        "User updated",
    )))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    state.user_service.delete_user(current.id, id).await?;
    Ok(NoContent)
}

/// Roles an account can hold
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Users",
    responses(
        (status = 200, description = "Configured roles", body = [RoleRecord]),
        (status = 403, description = "Admin rights required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_roles(State(state): State<AppState>) -> AppResult<Json<Vec<RoleRecord>>> {
    let roles = state.user_service.list_roles().await?;
    Ok(Json(roles))
}

/// Role counts across all accounts
#[utoipa::path(
    get,
    path = "/api/roles/stats",
    tag = "Users",
    responses(
        (status = 200, description = "Accounts per role", body = RoleStats),
        (status = 403, description = "Admin rights required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn role_stats(State(state): State<AppState>) -> AppResult<Json<RoleStats>> {
    let stats = state.user_service.role_stats().await?;
    Ok(Json(stats))
}

/// Give an account a clerk role, or remove it with an absent or blank role
#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    request_body = RoleAssignment,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 400, description = "Not an assignable role"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<RoleAssignment>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    tracing::debug!(admin_id = current.id, user_id = id, role = ?payload.role, "Changing role");
    let user = state
        .user_service
        .change_role(id, payload.role.as_deref())
        .await?;

    let message = match user.role {
        Some(role) => format!("Role {} assigned", role),
        None => "Role removed".to_string(),
    };
    Ok(Json(ApiResponse::with_message(UserResponse::from(user), message)))
}

/// Give several accounts the same clerk role
#[utoipa::path(
    post,
    path = "/api/users/roles/bulk",
    tag = "Users",
    request_body = BulkRoleAssignment,
    responses(
        (status = 200, description = "Accounts updated and ids that matched none", body = BulkAssignmentResult),
        (status = 400, description = "No users or not an assignable role")
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_roles(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BulkRoleAssignment>,
) -> AppResult<Json<BulkAssignmentResult>> {
    let result = state.user_service.assign_roles(payload).await?;
    Ok(Json(result))
}
