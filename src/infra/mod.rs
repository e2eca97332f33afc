//! Infrastructure layer - External systems integration
//!
//! - Database connection pool and migrations
//! - Repositories over the case and user tables
//! - Unit of Work for transactional writes
//! - Query timeout wrapper
//! - In-memory login throttle

pub mod db;
pub mod login_throttle;
pub mod query_timeout;
pub mod repositories;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use login_throttle::{Blocked, LoginThrottle, ThrottlePolicy};
pub use query_timeout::bounded;
pub use repositories::{
    CaseRepository, CaseStore, DashboardRepository, DashboardStore, GroupedCounts, NewUser,
    TableTotals, UserChanges, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, TransactionContext, TxUserRepository, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockCaseRepository, MockDashboardRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use test_support::TestUnitOfWork;
