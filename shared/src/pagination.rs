//! Offset pagination for list endpoints

use serde::{Deserialize, Serialize};

/// Page size used when the caller sends none or a non-positive one
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page a caller can request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw page request as received from the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self { page, page_size }
    }

    /// 1-indexed page number
    pub fn page(&self) -> u32 {
        match self.page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        }
    }

    pub fn page_size(&self) -> u32 {
        match self.page_size {
            Some(s) if s >= 1 => s.min(MAX_PAGE_SIZE as i64) as u32,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// Rows to skip
    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.page_size() as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size() as i64
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Matching rows across all pages
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        let total_pages = if page_size > 0 {
            total.div_ceil(page_size as u64) as u32
        } else {
            1
        };

        Self {
            data,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    pub fn from_request(data: Vec<T>, total: u64, req: &PageRequest) -> Self {
        Self::new(data, total, req.page(), req.page_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_normalisation() {
        assert_eq!(PageRequest::new(None, None).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(None, Some(0)).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(None, Some(-5)).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(None, Some(1000)).page_size(), MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(None, Some(100)).page_size(), 100);
        assert_eq!(PageRequest::new(None, Some(25)).page_size(), 25);
    }

    #[test]
    fn test_page_normalisation() {
        assert_eq!(PageRequest::new(Some(0), None).page(), 1);
        assert_eq!(PageRequest::new(Some(-3), None).page(), 1);
        assert_eq!(PageRequest::new(None, None).page(), 1);
        assert_eq!(PageRequest::new(Some(4), None).page(), 4);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(Some(1), Some(20)).offset(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
        assert_eq!(PageRequest::new(Some(0), Some(0)).offset(), 0);
    }

    #[test]
    fn test_paginated_response() {
        let items = vec!["a", "b", "c"];
        let resp = PaginatedResponse::new(items, 101, 2, 10);

        assert_eq!(resp.total, 101);
        assert_eq!(resp.page, 2);
        assert_eq!(resp.total_pages, 11);

        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], 0, 1, 10);
        assert_eq!(empty.total_pages, 0);
    }
}
