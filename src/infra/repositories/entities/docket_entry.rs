//! Docket entry ("ingreso") database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::DocketEntry;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ingresos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub expediente_id: i32,
    pub fecha_ingreso: Option<Date>,
    pub observaciones: Option<String>,
    pub solicitud: Option<String>,
    pub fechas: Option<String>,
    pub actuacion_id: Option<i32>,
    pub ubicacion: Option<String>,
    pub fecha_estado_auto: Option<Date>,
    pub juzgado_origen: Option<String>,
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

impl From<Model> for DocketEntry {
    fn from(model: Model) -> Self {
        DocketEntry {
            id: model.id,
            case_id: model.expediente_id,
            intake_date: model.fecha_ingreso,
            observations: model.observaciones,
            request: model.solicitud,
            secondary_dates: model.fechas,
            filing_id: model.actuacion_id,
            location: model.ubicacion,
            status_order_date: model.fecha_estado_auto,
            origin_court: model.juzgado_origen,
        }
    }
}
