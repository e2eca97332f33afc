//! Migration: roles and user accounts.

use sea_orm_migration::prelude::*;

use crate::config::{ROLE_ADMINISTRADOR, ROLE_ESCRIBIENTE, ROLE_SUSTANCIADOR};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Roles::NombreRol)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Roles::Descripcion).text().null())
                    .col(
                        ColumnDef::new(Roles::FechaCreacion)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        let seed = Query::insert()
            .into_table(Roles::Table)
            .columns([Roles::NombreRol, Roles::Descripcion])
            .values_panic([
                ROLE_ESCRIBIENTE.into(),
                "Registra ingresos y actuaciones".into(),
            ])
            .values_panic([
                ROLE_SUSTANCIADOR.into(),
                "Sustancia y proyecta decisiones".into(),
            ])
            .values_panic([
                ROLE_ADMINISTRADOR.into(),
                "Administra usuarios y roles".into(),
            ])
            .on_conflict(OnConflict::column(Roles::NombreRol).do_nothing().to_owned())
            .to_owned();
        manager.exec_stmt(seed).await?;

        manager
            .create_table(
                Table::create()
                    .table(Usuarios::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Usuarios::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Usuarios::Nombre).string_len(255).null())
                    .col(
                        ColumnDef::new(Usuarios::Usuario)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Usuarios::Correo)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Usuarios::Contrasena).string_len(255).not_null())
                    .col(ColumnDef::new(Usuarios::RolId).integer().null())
                    .col(
                        ColumnDef::new(Usuarios::Administrador)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Usuarios::Activo)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Usuarios::FechaRegistro)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usuarios_rol_id")
                            .from(Usuarios::Table, Usuarios::RolId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Usuarios::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    NombreRol,
    Descripcion,
    FechaCreacion,
}

#[derive(Iden)]
enum Usuarios {
    Table,
    Id,
    Nombre,
    Usuario,
    Correo,
    Contrasena,
    RolId,
    Administrador,
    Activo,
    FechaRegistro,
}
