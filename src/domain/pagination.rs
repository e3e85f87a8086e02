use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// A resolved page request: `page` is 1-based and `limit` already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: Option<i64>, limit: Option<i64>, config: &PaginationConfig) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(config.default_limit)
            .clamp(1, config.max_limit.max(1));
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None, &PaginationConfig::default())
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_pages: i64,
    pub current_page: i64,
    pub total: i64,
}

#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: Page,
}

impl<T> Paginated<T> {
    pub fn info(&self) -> PageInfo {
        PageInfo {
            total_pages: total_pages(self.total, self.page.limit),
            current_page: self.page.page,
            total: self.total,
        }
    }
}
