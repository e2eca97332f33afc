//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod case_repository;
mod dashboard_repository;
pub(crate) mod entities;
pub(crate) mod user_repository;

pub use case_repository::{CaseRepository, CaseStore, OwnerStatusCounts};
pub use dashboard_repository::{DashboardRepository, DashboardStore, GroupedCounts, TableTotals};
pub use user_repository::{NewUser, UserChanges, UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use case_repository::MockCaseRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use dashboard_repository::MockDashboardRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
