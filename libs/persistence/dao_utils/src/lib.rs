pub mod pagination;
pub mod query_helpers;

pub use pagination::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest,
    PaginationError, total_pages,
};
pub use query_helpers::{
    count_query, first_row_or_not_found, is_unique_violation,
};
