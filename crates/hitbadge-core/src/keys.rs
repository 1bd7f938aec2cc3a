//! Canonical counter key layout.
//!
//! ```text
//! hits:daily:{url}:{YYYY-MM-DD}   -> daily count (expires DAILY_TTL_SECS after last incr)
//! hits:total:{url}                -> cumulative count (never expires)
//! ```

use chrono::NaiveDate;

use crate::badge::PageId;

/// Daily keys expire two days after their last increment.
pub const DAILY_TTL_SECS: u64 = 60 * 60 * 24 * 2;

pub fn daily_key(page: &PageId, day: NaiveDate) -> String {
    format!("hits:daily:{}:{}", page.as_str(), day.format("%Y-%m-%d"))
}

pub fn total_key(page: &PageId) -> String {
    format!("hits:total:{}", page.as_str())
}
