//! Check-password command - Prints the strength report for a password.

use crate::cli::args::CheckPasswordArgs;
use crate::domain::validate_password;
use crate::errors::{AppError, AppResult};

/// Execute the check-password command. Never touches the database.
pub fn execute(args: CheckPasswordArgs) -> AppResult<()> {
    let report = validate_password(&args.password);
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::internal(format!("Failed to render report: {}", e)))?;

    println!("{}", rendered);
    Ok(())
}
