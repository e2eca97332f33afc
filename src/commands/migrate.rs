//! Migrate command - Database migration management.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppResult, ResultExt};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // Connect without auto-running migrations for manual control
    let db = Database::connect_without_migrations(&config)
        .await
        .context("connecting to the database")?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.context("applying migrations")?;
            tracing::info!("Migrations applied");
        }
        MigrateAction::Down => {
            db.rollback_migration()
                .await
                .context("rolling back the last migration")?;
            tracing::info!("Last migration rolled back");
        }
        MigrateAction::Status => {
            let status = db
                .migration_status()
                .await
                .context("reading migration status")?;
            for (name, applied) in status {
                println!("{}: {}", name, if applied { "applied" } else { "pending" });
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping every table and re-running all migrations");
            db.fresh_migrations()
                .await
                .context("re-creating the schema")?;
            tracing::info!("Schema re-created");
        }
    }

    Ok(())
}
