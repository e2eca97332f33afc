//! User domain entity and related types.

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{ROLE_ADMINISTRADOR, ROLE_ESCRIBIENTE, ROLE_SUSTANCIADOR};
use crate::errors::AppError;

/// Roles drawn from the closed set seeded in the `roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Escribiente,
    Sustanciador,
    Administrador,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Escribiente => ROLE_ESCRIBIENTE,
            Role::Sustanciador => ROLE_SUSTANCIADOR,
            Role::Administrador => ROLE_ADMINISTRADOR,
        }
    }
}

impl Role {
    /// Roles an administrator hands out from role management. Admin rights
    /// come from the account flag instead.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Role::Escribiente | Role::Sustanciador)
    }

    /// Parse a role name that role management may assign.
    pub fn parse_assignable(name: &str) -> Result<Self, AppError> {
        let role: Role = name.parse()?;
        if !role.is_assignable() {
            return Err(AppError::validation(format!(
                "Role must be one of: {}, {}",
                ROLE_ESCRIBIENTE, ROLE_SUSTANCIADOR
            )));
        }
        Ok(role)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            ROLE_ESCRIBIENTE => Ok(Role::Escribiente),
            ROLE_SUSTANCIADOR => Ok(Role::Sustanciador),
            ROLE_ADMINISTRADOR => Ok(Role::Administrador),
            other => Err(AppError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: Option<String>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
    pub is_admin: bool,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Admin flag or the administrator role.
    pub fn has_admin_rights(&self) -> bool {
        self.is_admin || self.role == Some(Role::Administrador)
    }
}

/// Role row as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleRecord {
    pub id: i32,
    #[schema(example = "ESCRIBIENTE")]
    pub name: String,
    pub description: Option<String>,
}

/// User creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    /// Display name
    #[schema(example = "Laura Gómez")]
    pub name: Option<String>,
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[schema(example = "lgomez")]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "lgomez@juzgado.gov.co")]
    pub email: String,
    /// Must pass the password strength rules
    #[schema(example = "Juzg4do#Seguro")]
    pub password: String,
    /// One of ESCRIBIENTE, SUSTANCIADOR, ADMINISTRADOR
    #[schema(example = "ESCRIBIENTE")]
    pub role: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// User update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Role name; an empty string removes the role
    #[schema(example = "SUSTANCIADOR")]
    pub role: Option<String>,
    pub is_admin: Option<bool>,
    pub active: Option<bool>,
    /// New password, checked against the strength rules
    pub password: Option<String>,
}

/// What an update does to a user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Keep,
    Clear,
    Set(Role),
}

impl RoleChange {
    /// `None` keeps, blank clears, anything else must name a valid role.
    pub fn from_request(role: Option<&str>) -> Result<Self, AppError> {
        match role.map(str::trim) {
            None => Ok(RoleChange::Keep),
            Some("") => Ok(RoleChange::Clear),
            Some(name) => name.parse().map(RoleChange::Set),
        }
    }
}

/// Parse an optional role name from a create request.
pub fn parse_optional_role(role: Option<&str>) -> Result<Option<Role>, AppError> {
    match role.map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => name.parse().map(Some),
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    #[schema(example = "Laura Gómez")]
    pub name: Option<String>,
    #[schema(example = "lgomez")]
    pub username: String,
    #[schema(example = "lgomez@juzgado.gov.co")]
    pub email: String,
    pub role: Option<Role>,
    pub is_admin: bool,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            role: user.role,
            is_admin: user.is_admin,
            active: user.active,
            created_at: user.created_at,
        }
    }
}

/// Account counts shown on the user management page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub non_admins: usize,
    pub without_role: usize,
}

impl UserStats {
    pub fn from_users(users: &[User]) -> Self {
        let admins = users.iter().filter(|u| u.is_admin).count();
        Self {
            total: users.len(),
            admins,
            non_admins: users.len() - admins,
            without_role: users.iter().filter(|u| u.role.is_none()).count(),
        }
    }
}

/// Role distribution shown on the role management page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleStats {
    pub total_usuarios: usize,
    pub escribientes: usize,
    pub sustanciadores: usize,
    pub sin_rol: usize,
    pub activos: usize,
    pub inactivos: usize,
}

impl RoleStats {
    pub fn from_users(users: &[User]) -> Self {
        let with_role = |role: Role| users.iter().filter(|u| u.role == Some(role)).count();
        let activos = users.iter().filter(|u| u.active).count();
        Self {
            total_usuarios: users.len(),
            escribientes: with_role(Role::Escribiente),
            sustanciadores: with_role(Role::Sustanciador),
            sin_rol: users.iter().filter(|u| u.role.is_none()).count(),
            activos,
            inactivos: users.len() - activos,
        }
    }
}

/// Role change for one account. Absent or blank removes the role.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RoleAssignment {
    #[schema(example = "ESCRIBIENTE")]
    pub role: Option<String>,
}

/// The same role for several accounts at once.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulkRoleAssignment {
    #[validate(length(min = 1, message = "At least one user is required"))]
    pub user_ids: Vec<i32>,
    #[schema(example = "SUSTANCIADOR")]
    pub role: String,
}

/// Outcome of a bulk assignment. Ids with no matching account fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BulkAssignmentResult {
    #[serde(rename = "exitosos")]
    pub succeeded: usize,
    #[serde(rename = "fallidos")]
    pub failed: usize,
}

/// User listing with statistics
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserList {
    pub users: Vec<UserResponse>,
    #[serde(rename = "estadisticas")]
    pub stats: UserStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, role: Option<Role>, is_admin: bool) -> User {
        User {
            id,
            name: None,
            username: format!("user{}", id),
            email: format!("user{}@juzgado.gov.co", id),
            password_hash: String::new(),
            role,
            is_admin,
            active: true,
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("escribiente".parse::<Role>().unwrap(), Role::Escribiente);
        assert_eq!(" ADMINISTRADOR ".parse::<Role>().unwrap(), Role::Administrador);
        assert!("JUEZ".parse::<Role>().is_err());
    }

    #[test]
    fn test_admin_rights() {
        assert!(user(1, None, true).has_admin_rights());
        assert!(user(2, Some(Role::Administrador), false).has_admin_rights());
        assert!(!user(3, Some(Role::Escribiente), false).has_admin_rights());
        assert!(!user(4, None, false).has_admin_rights());
    }

    #[test]
    fn test_role_change_from_request() {
        assert_eq!(RoleChange::from_request(None).unwrap(), RoleChange::Keep);
        assert_eq!(RoleChange::from_request(Some("")).unwrap(), RoleChange::Clear);
        assert_eq!(
            RoleChange::from_request(Some("sustanciador")).unwrap(),
            RoleChange::Set(Role::Sustanciador)
        );
        assert!(RoleChange::from_request(Some("JUEZ")).is_err());
    }

    #[test]
    fn test_user_stats() {
        let users = vec![
            user(1, Some(Role::Administrador), true),
            user(2, Some(Role::Escribiente), false),
            user(3, None, false),
        ];
        let stats = UserStats::from_users(&users);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.admins, 1);
        assert_eq!(stats.non_admins, 2);
        assert_eq!(stats.without_role, 1);
    }

    #[test]
    fn test_role_stats() {
        let mut inactive = user(4, Some(Role::Sustanciador), false);
        inactive.active = false;
        let users = vec![
            user(1, Some(Role::Administrador), true),
            user(2, Some(Role::Escribiente), false),
            user(3, None, false),
            inactive,
        ];
        let stats = RoleStats::from_users(&users);

        assert_eq!(stats.total_usuarios, 4);
        assert_eq!(stats.escribientes, 1);
        assert_eq!(stats.sustanciadores, 1);
        assert_eq!(stats.sin_rol, 1);
        assert_eq!(stats.activos, 3);
        assert_eq!(stats.inactivos, 1);
    }

    #[test]
    fn test_only_clerk_roles_are_assignable() {
        assert_eq!(Role::parse_assignable(" escribiente ").unwrap(), Role::Escribiente);
        assert_eq!(Role::parse_assignable("SUSTANCIADOR").unwrap(), Role::Sustanciador);
        assert!(Role::parse_assignable("ADMINISTRADOR").is_err());
        assert!(Role::parse_assignable("JUEZ").is_err());
    }

    #[test]
    fn test_bulk_result_uses_wire_names() {
        let json = serde_json::to_value(BulkAssignmentResult {
            succeeded: 2,
            failed: 1,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "exitosos": 2, "fallidos": 1 }));
    }

    #[test]
    fn test_response_hides_password() {
        let json = serde_json::to_value(UserResponse::from(user(1, None, false))).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], serde_json::Value::Null);
    }
}
