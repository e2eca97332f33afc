//! Juzgado - Application entry point

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use juzgado::{
    cli::{Cli, Commands},
    commands,
    config::Config,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, load_config()).await,
        Commands::Migrate(args) => commands::migrate::execute(args, load_config()).await,
        Commands::CreateAdmin(args) => {
            commands::create_admin::execute(args, load_config()).await
        }
        // Works offline, without a session secret or database.
        Commands::CheckPassword(args) => commands::check_password::execute(args),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn load_config() -> Config {
    let config = Config::from_env();
    tracing::debug!("Configuration loaded");
    config
}

/// `--verbose` forces debug; otherwise `RUST_LOG`, defaulting to info.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}
