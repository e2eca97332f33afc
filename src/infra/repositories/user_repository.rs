//! User and role persistence.
//!
//! Reads go through [`UserRepository`]. Writes that touch more than one row
//! (role lookup plus insert or update) run inside a transaction through
//! [`crate::infra::TxUserRepository`], which shares the query helpers below.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, NotSet, QueryFilter, QueryOrder, Set, SqlErr,
};

use super::entities::{role, user};
use crate::domain::{Role, RoleChange, RoleRecord, User};
use crate::errors::{AppError, AppResult, OptionExt, ResultExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Fields of a new account, password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: Option<String>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
    pub is_admin: bool,
}

/// Changes to an existing account. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: RoleChange,
    pub is_admin: Option<bool>,
    pub active: Option<bool>,
    pub password_hash: Option<String>,
}

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find user whose username or email equals `identifier`
    async fn find_by_login(&self, identifier: &str) -> AppResult<Option<User>>;

    /// List all users ordered by username
    async fn list(&self) -> AppResult<Vec<User>>;

    /// List the configured roles
    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>>;

    /// Delete user by ID
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        find_user_by_id(&self.db, id).await
    }

    async fn find_by_login(&self, identifier: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find()
            .filter(login_condition(identifier))
            .find_also_related(role::Entity)
            .one(&self.db)
            .await
            .context("looking up login")?;

        Ok(result.map(|(model, role)| user::into_user(model, role)))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let rows = user::Entity::find()
            .find_also_related(role::Entity)
            .order_by_asc(user::Column::Usuario)
            .all(&self.db)
            .await
            .context("listing users")?;

        Ok(rows
            .into_iter()
            .map(|(model, role)| user::into_user(model, role))
            .collect())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let models = role::Entity::find()
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await
            .context("listing roles")?;

        Ok(models.into_iter().map(RoleRecord::from).collect())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("deleting user")?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}

/// Exact username, or email compared case-insensitively.
fn login_condition(identifier: &str) -> Condition {
    Condition::any()
        .add(user::Column::Usuario.eq(identifier))
        .add(Expr::expr(Func::lower(Expr::col(user::Column::Correo))).eq(identifier.to_lowercase()))
}

pub(crate) async fn find_user_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<User>> {
    let result = user::Entity::find_by_id(id)
        .find_also_related(role::Entity)
        .one(db)
        .await
        .context("loading user")?;

    Ok(result.map(|(model, role)| user::into_user(model, role)))
}

/// Primary key of a seeded role.
pub(crate) async fn role_id<C: ConnectionTrait>(db: &C, role: Role) -> AppResult<i32> {
    role::Entity::find()
        .filter(role::Column::NombreRol.eq(role.as_str()))
        .one(db)
        .await
        .context("resolving role")?
        .map(|r| r.id)
        .ok_or_else(|| AppError::validation(format!("Role {} is not configured", role)))
}

/// Fail with a conflict when another account already uses the username or
/// email. `except` skips the account being updated.
pub(crate) async fn ensure_unique<C: ConnectionTrait>(
    db: &C,
    username: Option<&str>,
    email: Option<&str>,
    except: Option<i32>,
) -> AppResult<()> {
    let taken = |column: user::Column, value: &str| {
        let mut query = user::Entity::find().filter(column.eq(value));
        if let Some(id) = except {
            query = query.filter(user::Column::Id.ne(id));
        }
        query
    };

    if let Some(username) = username {
        if taken(user::Column::Usuario, username)
            .one(db)
            .await
            .context("checking username")?
            .is_some()
        {
            return Err(AppError::conflict("Username"));
        }
    }
    if let Some(email) = email {
        if taken(user::Column::Correo, email)
            .one(db)
            .await
            .context("checking email")?
            .is_some()
        {
            return Err(AppError::conflict("Email"));
        }
    }

    Ok(())
}

pub(crate) async fn insert_user<C: ConnectionTrait>(db: &C, new_user: NewUser) -> AppResult<User> {
    ensure_unique(db, Some(&new_user.username), Some(&new_user.email), None).await?;

    let rol_id = match new_user.role {
        Some(role) => Some(role_id(db, role).await?),
        None => None,
    };

    let active_model = user::ActiveModel {
        id: NotSet,
        nombre: Set(new_user.name),
        usuario: Set(new_user.username),
        correo: Set(new_user.email),
        contrasena: Set(new_user.password_hash),
        rol_id: Set(rol_id),
        administrador: Set(new_user.is_admin),
        activo: Set(true),
        fecha_registro: Set(chrono::Utc::now().naive_utc()),
    };

    let model = active_model
        .insert(db)
        .await
        .map_err(|e| write_error(e, "creating user"))?;
    find_user_by_id(db, model.id).await?.ok_or_not_found()
}

pub(crate) async fn update_user<C: ConnectionTrait>(
    db: &C,
    id: i32,
    changes: UserChanges,
) -> AppResult<User> {
    let model = user::Entity::find_by_id(id)
        .one(db)
        .await
        .context("loading user")?
        .ok_or_not_found()?;

    ensure_unique(db, None, changes.email.as_deref(), Some(id)).await?;

    let mut active: user::ActiveModel = model.into();

    if let Some(name) = changes.name {
        active.nombre = Set(Some(name));
    }
    if let Some(email) = changes.email {
        active.correo = Set(email);
    }
    match changes.role {
        RoleChange::Keep => {}
        RoleChange::Clear => active.rol_id = Set(None),
        RoleChange::Set(role) => active.rol_id = Set(Some(role_id(db, role).await?)),
    }
    if let Some(is_admin) = changes.is_admin {
        active.administrador = Set(is_admin);
    }
    if let Some(activo) = changes.active {
        active.activo = Set(activo);
    }
    if let Some(hash) = changes.password_hash {
        active.contrasena = Set(hash);
    }

    active
        .update(db)
        .await
        .map_err(|e| write_error(e, "updating user"))?;
    find_user_by_id(db, id).await?.ok_or_not_found()
}

/// The pre-write uniqueness check can race with a concurrent write; the
/// unique index then has the final say and is reported as a conflict.
fn write_error(err: DbErr, context: &str) -> AppError {
    classify_write_error(err.sql_err(), err, context)
}

fn classify_write_error(sql_err: Option<SqlErr>, source: DbErr, context: &str) -> AppError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::warn!(%detail, "Unique index rejected user write");
            if detail.contains("correo") {
                AppError::conflict("Email")
            } else {
                AppError::conflict("Username")
            }
        }
        _ => AppError::Storage {
            context: context.to_string(),
            source,
        },
    }
}

/// Give every listed account `role` and reactivate it. Returns how many
/// accounts matched.
pub(crate) async fn assign_role<C: ConnectionTrait>(
    db: &C,
    ids: &[i32],
    role: Role,
) -> AppResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let rol_id = role_id(db, role).await?;

    let result = user::Entity::update_many()
        .col_expr(user::Column::RolId, Expr::value(rol_id))
        .col_expr(user::Column::Activo, Expr::value(true))
        .filter(user::Column::Id.is_in(ids.iter().copied()))
        .exec(db)
        .await
        .context("assigning roles")?;

    Ok(result.rows_affected)
}

pub(crate) async fn set_password_hash<C: ConnectionTrait>(
    db: &C,
    id: i32,
    hash: String,
) -> AppResult<()> {
    let active = user::ActiveModel {
        id: Set(id),
        contrasena: Set(hash),
        ..Default::default()
    };
    active.update(db).await.context("storing password digest")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    #[test]
    fn test_login_matches_email_case_insensitively() {
        let sql = user::Entity::find()
            .filter(login_condition("LGomez@Juzgado.gov.co"))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("LOWER(\"correo\") = 'lgomez@juzgado.gov.co'"), "{}", sql);
        assert!(sql.contains("\"usuario\" = 'LGomez@Juzgado.gov.co'"), "{}", sql);
    }

    #[test]
    fn test_unique_violation_is_a_conflict() {
        let err = classify_write_error(
            Some(SqlErr::UniqueConstraintViolation(
                "duplicate key value violates unique constraint \"usuarios_correo_key\"".into(),
            )),
            DbErr::Custom("duplicate key".into()),
            "creating user",
        );
        assert!(matches!(err, AppError::Conflict(field) if field == "Email"));

        let err = classify_write_error(
            Some(SqlErr::UniqueConstraintViolation(
                "duplicate key value violates unique constraint \"usuarios_usuario_key\"".into(),
            )),
            DbErr::Custom("duplicate key".into()),
            "creating user",
        );
        assert!(matches!(err, AppError::Conflict(field) if field == "Username"));
    }

    #[test]
    fn test_other_write_failures_stay_storage_errors() {
        let err = classify_write_error(
            None,
            DbErr::Custom("connection reset".into()),
            "updating user",
        );
        assert!(matches!(err, AppError::Storage { context, .. } if context == "updating user"));
    }
}
