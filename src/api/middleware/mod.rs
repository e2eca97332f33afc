//! API middleware.

mod rate_limit;
mod session;

pub use rate_limit::{client_identifier, login_rate_limit, ClientAddress};
pub use session::{require_admin, session_gate, CurrentUser};
