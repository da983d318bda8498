use std::cmp;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A one-based page window over an ordered result set.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: cmp::min(limit, MAX_PAGE_SIZE).max(1),
        }
    }

    /// Build a request from optional query values, falling back to page 1
    /// and `default_limit`.
    pub fn from_query(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self::new(page.unwrap_or(1), limit.unwrap_or(default_limit))
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip, for `LIMIT ? OFFSET ?` clauses.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            limit: request.limit(),
            total,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total.div_ceil(u64::from(self.limit.max(1))) as u32
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }
}
