//! Sorting and pagination shared by the list endpoints.
//!
//! List responses keep the shape the workshop clients expect:
//! `{"<collection>": [...], "total_count", "returned_count", "offset", "limit"}`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cmp::Ordering;

use crate::error::ApiError;

pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Sorts `items` with `cmp`, reversed for `Desc`. Stable in both directions:
    /// records comparing equal keep their stored order.
    pub fn sort<T>(self, items: &mut [T], cmp: impl Fn(&T, &T) -> Ordering) {
        match self {
            SortOrder::Asc => items.sort_by(|a, b| cmp(a, b)),
            SortOrder::Desc => items.sort_by(|a, b| cmp(b, a)),
        }
    }
}

/// `offset` / `limit` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl PageParams {
    pub fn new(offset: Option<usize>, limit: Option<usize>) -> Result<Self, ApiError> {
        if let Some(limit) = limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(ApiError::validation(
                    "limit",
                    format!("must be between 1 and {MAX_PAGE_SIZE}"),
                ));
            }
        }
        Ok(Self { offset, limit })
    }

    /// Cuts one page out of an already filtered and sorted list
    pub fn apply<T>(self, items: Vec<T>) -> Page<T> {
        let total_count = items.len();
        let offset = self.offset.unwrap_or(0);
        let items: Vec<T> = items
            .into_iter()
            .skip(offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        Page {
            returned_count: items.len(),
            items,
            total_count,
            offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub returned_count: usize,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl<T: Serialize> Page<T> {
    /// Wraps the page in the list envelope, the records under `key`
    pub fn into_json(self, key: &str) -> Value {
        json!({
            key: self.items,
            "total_count": self.total_count,
            "returned_count": self.returned_count,
            "offset": self.offset,
            "limit": self.limit,
        })
    }
}

/// Rounds half away from zero to `decimals` places (cents, one-decimal ratings...)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Case-insensitive substring match used by the name / email filters
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
