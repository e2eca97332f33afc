//! Custom request extractors.

mod current_user;
mod query;
mod validated_json;

pub use query::ApiQuery;
pub use validated_json::ValidatedJson;
