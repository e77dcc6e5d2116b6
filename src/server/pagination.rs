//! Fixed-size pages over ordered question lists.

use std::fmt;

pub const QUESTIONS_PER_PAGE: usize = 10;

/// A 1-based page number. Numbers below 1 are representable but address no items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(i64);

impl Page {
    pub fn new(number: i64) -> Self {
        Page(number)
    }

    pub fn first() -> Self {
        Page(1)
    }

    pub fn limit(&self) -> i64 {
        QUESTIONS_PER_PAGE as i64
    }

    /// Number of items preceding this page, or `None` when the page cannot hold any.
    pub fn offset(&self) -> Option<i64> {
        if self.0 < 1 {
            return None;
        }
        (self.0 - 1).checked_mul(self.limit())
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::first()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slice of `items` shown on `page`; empty when the page lies outside the list.
pub fn paginate<T>(page: Page, items: &[T]) -> &[T] {
    let Some(start) = page.offset().and_then(|offset| usize::try_from(offset).ok()) else {
        return &[];
    };
    let start = start.min(items.len());
    let end = start.saturating_add(QUESTIONS_PER_PAGE).min(items.len());
    &items[start..end]
}
