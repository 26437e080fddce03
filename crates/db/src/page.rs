//! Pagination request and page envelope types.
//!
//! Pages are zero-based: page `0` is the first page. A [`Page`] serializes as
//!
//! ```json
//! { "content": [...], "page": { "size": 20, "number": 1, "totalElements": 41, "totalPages": 3 } }
//! ```

use serde::{Deserialize, Serialize};

/// Which slice of a result set to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page number.
    pub number: u64,
    /// Maximum number of items per page. Never zero.
    pub size: u64,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u64 = 20;

    /// Creates a page request, returning `None` when `size` is zero.
    pub fn new(number: u64, size: u64) -> Option<Self> {
        (size > 0).then_some(Self { number, size })
    }

    /// Number of items to skip before this page starts.
    pub fn offset(&self) -> u64 {
        self.number.saturating_mul(self.size)
    }

    /// Slices an already filtered and ordered result set down to this page.
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let content = items
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(self.size).unwrap_or(usize::MAX))
            .collect();
        Page::new(content, *self, total)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: 0,
            size: Self::DEFAULT_SIZE,
        }
    }
}

/// Pagination metadata carried next to a page's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: u64,
    pub number: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl PageMetadata {
    pub fn new(request: PageRequest, total_elements: u64) -> Self {
        Self {
            size: request.size,
            number: request.number,
            total_elements,
            total_pages: total_pages(total_elements, request.size),
        }
    }
}

/// Number of pages needed to hold `total_elements` items, `size` per page.
///
/// Ceiling division: an exact multiple does not produce a trailing empty page.
pub fn total_pages(total_elements: u64, size: u64) -> u64 {
    if size == 0 {
        return 0;
    }
    total_elements.div_ceil(size)
}

/// A single page of results plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: PageMetadata,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: PageMetadata::new(request, total_elements),
        }
    }
}
