//! User service - Account administration.
//!
//! Every write runs inside one transaction so the user row and its role link
//! change together or not at all.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::domain::{
    parse_optional_role, BulkAssignmentResult, BulkRoleAssignment, CreateUser, Password, Role,
    RoleChange, RoleRecord, RoleStats, UpdateUser, User, UserList, UserResponse, UserStats,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{bounded, NewUser, UnitOfWork, UserChanges};
use crate::with_transaction;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: i32) -> AppResult<User>;

    /// All accounts with summary statistics
    async fn list_users(&self) -> AppResult<UserList>;

    /// Roles an account can be given
    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>>;

    /// Create an account; the password must pass the strength rules
    async fn create_user(&self, request: CreateUser) -> AppResult<User>;

    /// Apply a partial update
    async fn update_user(&self, id: i32, request: UpdateUser) -> AppResult<User>;

    /// Delete an account. `actor_id` may not delete itself.
    async fn delete_user(&self, actor_id: i32, id: i32) -> AppResult<()>;

    /// Role distribution across all accounts
    async fn role_stats(&self) -> AppResult<RoleStats>;

    /// Give one account a clerk role and reactivate it, or remove its role
    /// when `role` is absent or blank
    async fn change_role(&self, id: i32, role: Option<&str>) -> AppResult<User>;

    /// Give several accounts the same clerk role in one transaction
    async fn assign_roles(&self, request: BulkRoleAssignment) -> AppResult<BulkAssignmentResult>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    query_timeout: Duration,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>, query_timeout: Duration) -> Self {
        Self { uow, query_timeout }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        let users = self.uow.users();
        bounded(self.query_timeout, "loading user", users.find_by_id(id))
            .await?
            .ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<UserList> {
        let users = self.uow.users();
        let all = bounded(self.query_timeout, "listing users", users.list()).await?;

        Ok(UserList {
            stats: UserStats::from_users(&all),
            users: all.into_iter().map(UserResponse::from).collect(),
        })
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let users = self.uow.users();
        bounded(self.query_timeout, "listing roles", users.list_roles()).await
    }

    async fn create_user(&self, request: CreateUser) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let password = Password::new(&request.password)?;
        let new_user = NewUser {
            name: non_blank(request.name),
            username: request.username.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password_hash: password.into_string(),
            role: parse_optional_role(request.role.as_deref())?,
            is_admin: request.is_admin,
        };

        let user = bounded(self.query_timeout, "creating user", async {
            with_transaction!(self.uow, |ctx| ctx.users().create(new_user).await)
        })
        .await?;

        tracing::info!(
            user_id = user.id,
            username = %user.username,
            role = ?user.role,
            is_admin = user.is_admin,
            "User created"
        );
        Ok(user)
    }

    async fn update_user(&self, id: i32, request: UpdateUser) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let role = RoleChange::from_request(request.role.as_deref())?;
        let password_hash = match request.password.as_deref() {
            Some(plain) => Some(Password::new(plain)?.into_string()),
            None => None,
        };
        let changes = UserChanges {
            name: non_blank(request.name),
            email: non_blank(request.email).map(|e| e.to_lowercase()),
            role,
            is_admin: request.is_admin,
            active: request.active,
            password_hash,
        };

        let user = bounded(self.query_timeout, "updating user", async {
            with_transaction!(self.uow, |ctx| ctx.users().update(id, changes).await)
        })
        .await?;

        if role != RoleChange::Keep {
            tracing::info!(user_id = id, role = ?user.role, "User role changed");
        }
        tracing::info!(user_id = id, username = %user.username, "User updated");
        Ok(user)
    }

    async fn delete_user(&self, actor_id: i32, id: i32) -> AppResult<()> {
        if actor_id == id {
            return Err(AppError::bad_request("You cannot delete your own account"));
        }

        let users = self.uow.users();
        bounded(self.query_timeout, "deleting user", users.delete(id)).await?;

        tracing::info!(user_id = id, deleted_by = actor_id, "User deleted");
        Ok(())
    }

    async fn role_stats(&self) -> AppResult<RoleStats> {
        let users = self.uow.users();
        let all = bounded(self.query_timeout, "listing users", users.list()).await?;
        Ok(RoleStats::from_users(&all))
    }

    async fn change_role(&self, id: i32, role: Option<&str>) -> AppResult<User> {
        let (role, active) = match role.map(str::trim).filter(|r| !r.is_empty()) {
            Some(name) => (RoleChange::Set(Role::parse_assignable(name)?), Some(true)),
            None => (RoleChange::Clear, None),
        };
        let changes = UserChanges {
            name: None,
            email: None,
            role,
            is_admin: None,
            active,
            password_hash: None,
        };

        let user = bounded(self.query_timeout, "changing user role", async {
            with_transaction!(self.uow, |ctx| ctx.users().update(id, changes).await)
        })
        .await?;

        tracing::info!(user_id = id, role = ?user.role, "User role changed");
        Ok(user)
    }

    async fn assign_roles(&self, request: BulkRoleAssignment) -> AppResult<BulkAssignmentResult> {
        request
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        let role = Role::parse_assignable(&request.role)?;

        let mut ids = request.user_ids;
        ids.sort_unstable();
        ids.dedup();

        let updated = bounded(self.query_timeout, "assigning roles", async {
            let ids = ids.clone();
            with_transaction!(self.uow, |ctx| ctx.users().assign_role(&ids, role).await)
        })
        .await?;

        let result = BulkAssignmentResult {
            succeeded: updated as usize,
            failed: ids.len().saturating_sub(updated as usize),
        };
        tracing::info!(%role, succeeded = result.succeeded, failed = result.failed, "Roles assigned");
        Ok(result)
    }
}
