//! Create-admin command - Seeds the first administrator account.

use crate::cli::args::CreateAdminArgs;
use crate::config::{Config, ROLE_ADMINISTRADOR};
use crate::domain::CreateUser;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Execute the create-admin command. An existing account with the same
/// username or email is left untouched.
pub async fn execute(args: CreateAdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let services = Services::from_connection(db.get_connection(), config);

    let request = CreateUser {
        name: Some(args.name),
        username: args.username,
        email: args.email,
        password: args.password,
        role: Some(ROLE_ADMINISTRADOR.to_string()),
        is_admin: true,
    };

    match services.users().create_user(request).await {
        Ok(user) => {
            println!("Administrator '{}' created (id {})", user.username, user.id);
            Ok(())
        }
        Err(AppError::Conflict(field)) => {
            tracing::warn!("{} already in use, administrator not created", field);
            println!("{} already in use; nothing to do", field);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
