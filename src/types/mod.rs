//! Shared response and pagination types.

mod pagination;
mod response;

pub use pagination::{page_window, paginate, Paginated, PaginationMeta, PaginationParams};
pub use response::{ApiResponse, Created, MessageResponse, NoContent};
