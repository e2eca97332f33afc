//! Status event ("estado") database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::StatusEvent;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "estados")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub expediente_id: i32,
    pub fecha_estado: Option<Date>,
    pub fecha_auto: Option<Date>,
    pub clase: Option<String>,
    pub auto_anotacion: Option<String>,
    pub observaciones: Option<String>,
    pub actuacion_id: Option<i32>,
    pub ingresos_id: Option<i32>,
    pub demandante: Option<String>,
    pub demandado: Option<String>,
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

impl From<Model> for StatusEvent {
    fn from(model: Model) -> Self {
        StatusEvent {
            id: model.id,
            case_id: model.expediente_id,
            status_date: model.fecha_estado,
            order_date: model.fecha_auto,
            classification: model.clase,
            annotation: model.auto_anotacion,
            observations: model.observaciones,
            filing_id: model.actuacion_id,
            docket_entry_id: model.ingresos_id,
            plaintiff: model.demandante,
            defendant: model.demandado,
        }
    }
}
