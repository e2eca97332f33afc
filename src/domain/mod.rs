//! Domain layer - Core business entities and logic
//!
//! Case aggregates, status filtering, credentials and users. Nothing in here
//! touches storage or HTTP.

pub mod assignment;
pub mod case;
pub mod dashboard;
pub mod password;
pub mod password_policy;
pub mod status_filter;
pub mod user;

pub use assignment::{AssignedCases, AssignmentStats};
pub use case::{
    Case, CaseRecord, CaseStats, CaseSubRecords, DateSource, DocketEntry, Filing, ResolvedDate,
    ResolvedStatus, SearchSummary, StatusEvent, StatusSource,
};
pub use dashboard::{rank_counts, rank_statuses, DashboardMetrics, LabelCount};
pub use password::{hash_password, Password};
pub use password_policy::{validate_password, PasswordReport, Strength};
pub use status_filter::{DateField, DateRange, SortOrder, StatusFilter, StatusQuery};
pub use user::{
    parse_optional_role, BulkAssignmentResult, BulkRoleAssignment, CreateUser, Role,
    RoleAssignment, RoleChange, RoleRecord, RoleStats, UpdateUser, User, UserList, UserResponse,
    UserStats,
};
