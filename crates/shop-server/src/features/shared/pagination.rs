//! Shared pagination utilities
//!
//! ```rust,ignore
//! let params = PaginationParams::new(Some(2), Some(20));
//! params.validate()?;
//! let metadata = PaginationMetadata::new(params.page(), params.limit(), total);
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// `?page=&limit=` query parameters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page. Defaults to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Calculate the offset for SQL OFFSET clause
    pub fn offset(&self) -> i64 {
        self.page()
            .saturating_sub(1)
            .saturating_mul(self.limit())
    }

    /// Reject out-of-range values instead of clamping them
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.page() < 1 {
            return Err("Page must be greater than 0");
        }
        if !(1..=MAX_LIMIT).contains(&self.limit()) {
            return Err("Limit must be between 1 and 100");
        }
        if (self.page() - 1).checked_mul(self.limit()).is_none() {
            return Err("Page is too large");
        }
        Ok(())
    }
}

/// Pagination metadata for response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    /// Total number of pages
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Self {
            page,
            limit,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }

    pub fn from_params(params: &PaginationParams, total: i64) -> Self {
        Self::new(params.page(), params.limit(), total)
    }
}
