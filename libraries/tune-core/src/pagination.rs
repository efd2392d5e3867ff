//! Pagination helper types for listing queries

use crate::error::{Result, TuneError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub size: u32,
}

impl PageRequest {
    /// Create a validated page request
    ///
    /// # Examples
    ///
    /// ```
    /// use tune_core::pagination::PageRequest;
    ///
    /// let request = PageRequest::new(2, 20).unwrap();
    /// assert_eq!(request.offset(), 20);
    /// assert!(PageRequest::new(0, 20).is_err());
    /// ```
    pub fn new(page: u32, size: u32) -> Result<Self> {
        if page < 1 {
            return Err(TuneError::invalid_input("page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(TuneError::invalid_input(format!(
                "size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(Self { page, size })
    }

    /// Calculate the SQL OFFSET value
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }

    /// Get the LIMIT value (same as size)
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response containing items and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    pub page: u32,
    pub size: u32,
    /// Total number of pages
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let size = i64::from(request.size);
        Self {
            items,
            total,
            page: request.page,
            size: request.size,
            pages: (total + size - 1) / size,
        }
    }

    /// A page with no items, used when a filter can never match
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }
}
