//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `create-admin` - Seed an administrator account
//! - `check-password` - Score a password

pub mod args;

pub use args::{Cli, Commands};
