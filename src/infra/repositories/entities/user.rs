//! User ("usuarios") database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Role, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nombre: Option<String>,
    #[sea_orm(unique)]
    pub usuario: String,
    #[sea_orm(unique)]
    pub correo: String,
    pub contrasena: String,
    pub rol_id: Option<i32>,
    pub administrador: bool,
    pub activo: bool,
    pub fecha_registro: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RolId",
        to = "super::role::Column::Id",
        on_delete = "SetNull"
    )]
    Role,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Build the domain user from a row and its joined role, if any.
///
/// A role name outside the known set is treated as no role.
pub fn into_user(model: Model, role: Option<super::role::Model>) -> User {
    User {
        id: model.id,
        name: model.nombre,
        username: model.usuario,
        email: model.correo,
        password_hash: model.contrasena,
        role: role.and_then(|r| r.nombre_rol.parse::<Role>().ok()),
        is_admin: model.administrador,
        active: model.activo,
        created_at: model.fecha_registro,
    }
}
