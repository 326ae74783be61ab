use thiserror::Error;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page must be a positive integer, got {0}")]
    InvalidPage(i64),
    #[error("size must be between 1 and {MAX_PAGE_SIZE}, got {0}")]
    InvalidSize(i64),
}

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    size: i64,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::InvalidPage(page));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(PaginationError::InvalidSize(size));
        }
        Ok(Self { page, size })
    }

    /// Applies the defaults (page 1, size 10) to absent parameters.
    pub fn from_params(
        page: Option<i64>, size: Option<i64>,
    ) -> Result<Self, PaginationError> {
        Self::new(
            page.unwrap_or(DEFAULT_PAGE),
            size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    pub fn page(&self) -> i64 { self.page }

    pub fn size(&self) -> i64 { self.size }

    pub fn offset(&self) -> i64 { (self.page - 1).saturating_mul(self.size) }

    pub fn limit(&self) -> i64 { self.size }

    pub fn total_pages(&self, total_count: i64) -> i64 {
        total_pages(total_count, self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `ceil(total_count / size)`; zero rows means zero pages.
pub fn total_pages(total_count: i64, size: i64) -> i64 {
    if total_count <= 0 || size <= 0 {
        return 0;
    }
    (total_count + size - 1) / size
}
