//! Filing ("actuación") database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Filing;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "actuaciones")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub expediente_id: i32,
    pub numero_actuacion: Option<i32>,
    pub tipo_origen: Option<String>,
    pub descripcion_actuacion: Option<String>,
    pub archivo_origen: Option<String>,
    pub fecha_actuacion: Option<Date>,
    pub fecha_creacion: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::case::Entity",
        from = "Column::ExpedienteId",
        to = "super::case::Column::Id",
        on_delete = "Cascade"
    )]
    Case,
}

impl Related<super::case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Case.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Filing {
    fn from(model: Model) -> Self {
        Filing {
            id: model.id,
            case_id: model.expediente_id,
            number: model.numero_actuacion,
            origin_type: model.tipo_origen,
            description: model.descripcion_actuacion,
            source_file: model.archivo_origen,
            occurred_on: model.fecha_actuacion,
        }
    }
}
