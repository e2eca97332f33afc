//! Juzgado - case management for a judicial office
//!
//! Staff search cases ("expedientes") by case number, status or party name,
//! see a landing dashboard and administer user accounts.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Case aggregates, status filters, credentials, users
//! - **services**: Use cases over the Unit of Work
//! - **infra**: Database, migrations and repositories
//! - **api**: HTTP handlers, session gate and routes
//! - **types**: Pagination and response wrappers
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! juzgado migrate up
//! juzgado create-admin --email admin@juzgado.gov.co --password '...'
//! juzgado serve
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{CaseRecord, Password, Role, User};
pub use errors::{AppError, AppResult};
