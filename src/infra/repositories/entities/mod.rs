//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models. Table
//! and column names follow the existing Spanish schema.

pub mod case;
pub mod docket_entry;
pub mod filing;
pub mod role;
pub mod status_event;
pub mod user;

pub use case::Entity as CaseEntity;
pub use docket_entry::Entity as DocketEntryEntity;
pub use filing::Entity as FilingEntity;
pub use role::Entity as RoleEntity;
pub use status_event::Entity as StatusEventEntity;
pub use user::Entity as UserEntity;
