//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Juzgado - case search and user administration for a judicial office
#[derive(Parser, Debug)]
#[command(name = "juzgado")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (forces debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Create an administrator account
    CreateAdmin(CreateAdminArgs),

    /// Print the strength report for a password
    CheckPassword(CheckPasswordArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the create-admin command
#[derive(Parser, Debug)]
pub struct CreateAdminArgs {
    #[arg(short, long, default_value = "admin")]
    pub username: String,

    #[arg(short, long)]
    pub email: String,

    /// Must pass the password strength rules
    #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Display name
    #[arg(short, long, default_value = "Administrador del Sistema")]
    pub name: String,
}

/// Arguments for the check-password command
#[derive(Parser, Debug)]
pub struct CheckPasswordArgs {
    pub password: String,
}
