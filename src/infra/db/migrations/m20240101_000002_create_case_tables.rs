//! Migration: cases and their filings, docket entries and status events.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expediente::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expediente::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expediente::RadicadoCompleto).string_len(255).null())
                    .col(ColumnDef::new(Expediente::RadicadoCorto).string_len(255).null())
                    .col(ColumnDef::new(Expediente::Demandante).text().null())
                    .col(ColumnDef::new(Expediente::Demandado).text().null())
                    .col(ColumnDef::new(Expediente::Estado).string_len(100).null())
                    .col(ColumnDef::new(Expediente::EstadoAdicional).string_len(100).null())
                    .col(ColumnDef::new(Expediente::Responsable).string_len(255).null())
                    .col(ColumnDef::new(Expediente::Ubicacion).string_len(255).null())
                    .col(ColumnDef::new(Expediente::TipoSolicitud).string_len(255).null())
                    .col(ColumnDef::new(Expediente::JuzgadoOrigen).string_len(255).null())
                    .col(ColumnDef::new(Expediente::Observaciones).text().null())
                    .col(ColumnDef::new(Expediente::FechaIngreso).date().null())
                    .col(created_at(Expediente::FechaCreacion))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actuaciones::Table)
                    .if_not_exists()
                    .col(id(Actuaciones::Id))
                    .col(ColumnDef::new(Actuaciones::ExpedienteId).integer().not_null())
                    .col(ColumnDef::new(Actuaciones::NumeroActuacion).integer().null())
                    .col(ColumnDef::new(Actuaciones::TipoOrigen).string_len(100).null())
                    .col(ColumnDef::new(Actuaciones::DescripcionActuacion).text().null())
                    .col(ColumnDef::new(Actuaciones::ArchivoOrigen).string_len(255).null())
                    .col(ColumnDef::new(Actuaciones::FechaActuacion).date().null())
                    .col(created_at(Actuaciones::FechaCreacion))
                    .foreign_key(&mut case_fk("fk_actuaciones_expediente", Actuaciones::Table, Actuaciones::ExpedienteId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ingresos::Table)
                    .if_not_exists()
                    .col(id(Ingresos::Id))
                    .col(ColumnDef::new(Ingresos::ExpedienteId).integer().not_null())
                    .col(ColumnDef::new(Ingresos::FechaIngreso).date().null())
                    .col(ColumnDef::new(Ingresos::Observaciones).text().null())
                    .col(ColumnDef::new(Ingresos::Solicitud).text().null())
                    .col(ColumnDef::new(Ingresos::Fechas).text().null())
                    .col(ColumnDef::new(Ingresos::ActuacionId).integer().null())
                    .col(ColumnDef::new(Ingresos::Ubicacion).string_len(255).null())
                    .col(ColumnDef::new(Ingresos::FechaEstadoAuto).date().null())
                    .col(ColumnDef::new(Ingresos::JuzgadoOrigen).string_len(255).null())
                    .col(created_at(Ingresos::FechaCreacion))
                    .foreign_key(&mut case_fk("fk_ingresos_expediente", Ingresos::Table, Ingresos::ExpedienteId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Estados::Table)
                    .if_not_exists()
                    .col(id(Estados::Id))
                    .col(ColumnDef::new(Estados::ExpedienteId).integer().not_null())
                    .col(ColumnDef::new(Estados::FechaEstado).date().null())
                    .col(ColumnDef::new(Estados::FechaAuto).date().null())
                    .col(ColumnDef::new(Estados::Clase).string_len(255).null())
                    .col(ColumnDef::new(Estados::AutoAnotacion).text().null())
                    .col(ColumnDef::new(Estados::Observaciones).text().null())
                    .col(ColumnDef::new(Estados::ActuacionId).integer().null())
                    .col(ColumnDef::new(Estados::IngresosId).integer().null())
                    .col(ColumnDef::new(Estados::Demandante).text().null())
                    .col(ColumnDef::new(Estados::Demandado).text().null())
                    .col(created_at(Estados::FechaCreacion))
                    .foreign_key(&mut case_fk("fk_estados_expediente", Estados::Table, Estados::ExpedienteId))
                    .to_owned(),
            )
            .await?;

        let indexes = [
            index("idx_expediente_radicado_completo", Expediente::Table, Expediente::RadicadoCompleto),
            index("idx_expediente_radicado_corto", Expediente::Table, Expediente::RadicadoCorto),
            index("idx_expediente_estado", Expediente::Table, Expediente::Estado),
            index("idx_expediente_responsable", Expediente::Table, Expediente::Responsable),
            index("idx_expediente_fecha_ingreso", Expediente::Table, Expediente::FechaIngreso),
            index("idx_actuaciones_expediente_id", Actuaciones::Table, Actuaciones::ExpedienteId),
            index("idx_actuaciones_fecha", Actuaciones::Table, Actuaciones::FechaActuacion),
            index("idx_ingresos_expediente_id", Ingresos::Table, Ingresos::ExpedienteId),
            index("idx_ingresos_fecha_ingreso", Ingresos::Table, Ingresos::FechaIngreso),
            index("idx_estados_expediente_id", Estados::Table, Estados::ExpedienteId),
            index("idx_estados_fecha_estado", Estados::Table, Estados::FechaEstado),
        ];
        for stmt in indexes {
            manager.create_index(stmt).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first; indexes go with their tables.
        manager
            .drop_table(Table::drop().table(Estados::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ingresos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Actuaciones::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expediente::Table).to_owned())
            .await
    }
}

fn id<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn case_fk<T: IntoIden + 'static, C: IntoIden>(name: &str, table: T, col: C) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Expediente::Table, Expediente::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn index<T: IntoIden + 'static, C: IntoIden>(name: &str, table: T, col: C) -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name(name)
        .table(table)
        .col(col)
        .to_owned()
}

#[derive(Iden)]
enum Expediente {
    Table,
    Id,
    RadicadoCompleto,
    RadicadoCorto,
    Demandante,
    Demandado,
    Estado,
    EstadoAdicional,
    Responsable,
    Ubicacion,
    TipoSolicitud,
    JuzgadoOrigen,
    Observaciones,
    FechaIngreso,
    FechaCreacion,
}

#[derive(Iden)]
enum Actuaciones {
    Table,
    Id,
    ExpedienteId,
    NumeroActuacion,
    TipoOrigen,
    DescripcionActuacion,
    ArchivoOrigen,
    FechaActuacion,
    FechaCreacion,
}

#[derive(Iden)]
enum Ingresos {
    Table,
    Id,
    ExpedienteId,
    FechaIngreso,
    Observaciones,
    Solicitud,
    Fechas,
    ActuacionId,
    Ubicacion,
    FechaEstadoAuto,
    JuzgadoOrigen,
    FechaCreacion,
}

#[derive(Iden)]
enum Estados {
    Table,
    Id,
    ExpedienteId,
    FechaEstado,
    FechaAuto,
    Clase,
    AutoAnotacion,
    Observaciones,
    ActuacionId,
    IngresosId,
    Demandante,
    Demandado,
    FechaCreacion,
}
