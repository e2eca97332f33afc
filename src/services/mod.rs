//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure. They reach storage
//! only through the Unit of Work, and every storage call is bounded by the
//! configured query timeout.

mod auth_service;
mod case_service;
pub mod container;
mod dashboard_service;
mod user_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{issue_token, verify_token, AuthService, Authenticator, Claims, TokenResponse};
pub use case_service::{normalize_case_number, CaseAggregator, CaseNumberMatches, CaseService};
pub use dashboard_service::{DashboardReporter, DashboardService};
pub use user_service::{UserManager, UserService};
