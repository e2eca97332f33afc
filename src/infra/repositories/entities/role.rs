//! Role database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::RoleRecord;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub nombre_rol: String,
    pub descripcion: Option<String>,
    pub fecha_creacion: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RoleRecord {
    fn from(model: Model) -> Self {
        RoleRecord {
            id: model.id,
            name: model.nombre_rol,
            description: model.descripcion,
        }
    }
}
