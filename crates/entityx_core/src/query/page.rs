//! Page request and page result types.

use crate::config::DEFAULT_PAGE_SIZE;
use crate::store::error::{RepoError, RepoResult};
use serde::{Deserialize, Serialize};

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParam {
    pub page_num: u32,
    pub page_size: u32,
}

impl Default for PageParam {
    fn default() -> Self {
        Self {
            page_num: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParam {
    pub fn new(page_num: u32, page_size: u32) -> Self {
        Self {
            page_num,
            page_size,
        }
    }

    /// Rejects `page_num < 1` and `page_size == 0`.
    pub fn validate(&self) -> RepoResult<()> {
        if self.page_num == 0 {
            return Err(RepoError::Validation("page_num must be >= 1".to_string()));
        }
        if self.page_size == 0 {
            return Err(RepoError::Validation("page_size must be > 0".to_string()));
        }
        Ok(())
    }

    /// Rows skipped before this page: `(page_num - 1) * page_size`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_num.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of rows plus the full filtered count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub total: u64,
    pub list: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            list: Vec::new(),
        }
    }

    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            total: self.total,
            list: self.list.into_iter().map(f).collect(),
        }
    }
}
