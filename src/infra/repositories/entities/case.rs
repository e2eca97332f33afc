//! Case ("expediente") database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Case;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expediente")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub radicado_completo: Option<String>,
    pub radicado_corto: Option<String>,
    pub demandante: Option<String>,
    pub demandado: Option<String>,
    pub estado: Option<String>,
    pub estado_adicional: Option<String>,
    pub responsable: Option<String>,
    pub ubicacion: Option<String>,
    pub tipo_solicitud: Option<String>,
    pub juzgado_origen: Option<String>,
    pub observaciones: Option<String>,
    pub fecha_ingreso: Option<Date>,
    pub fecha_creacion: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::filing::Entity")]
    Filing,
    #[sea_orm(has_many = "super::docket_entry::Entity")]
    DocketEntry,
    #[sea_orm(has_many = "super::status_event::Entity")]
    StatusEvent,
}

impl Related<super::filing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Filing.def()
    }
}

impl Related<super::docket_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocketEntry.def()
    }
}

impl Related<super::status_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Case {
    fn from(model: Model) -> Self {
        Case {
            id: model.id,
            case_number_full: model.radicado_completo,
            case_number_short: model.radicado_corto,
            plaintiff: model.demandante,
            defendant: model.demandado,
            status: model.estado,
            status_detail: model.estado_adicional,
            owner: model.responsable,
            location: model.ubicacion,
            request_type: model.tipo_solicitud,
            origin_court: model.juzgado_origen,
            observations: model.observaciones,
            intake_date: model.fecha_ingreso,
            created_at: model.fecha_creacion,
        }
    }
}
