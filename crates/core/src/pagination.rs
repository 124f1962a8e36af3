//! Page-based listing envelope.
//!
//! Everything here is a pure function of the total item count, the requested
//! page, the page size and the base path, so it can be tested without a store.

use serde::Serialize;

/// Number of tickets per page.
pub const PER_PAGE: u64 = 15;

/// Navigation metadata for one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub current_page: u64,
    pub per_page: u64,
    /// 1-based index of the first item on the page, `None` when the page is empty.
    pub from: Option<u64>,
    /// 1-based index of the last item on the page, `None` when the page is empty.
    pub to: Option<u64>,
    pub path: String,
    pub first_page_url: String,
    pub next_page_url: Option<String>,
    pub prev_page_url: Option<String>,
}

impl PageLinks {
    /// Compute links for `page` out of `total` items.
    ///
    /// `page` 0 is treated as page 1. `per_page` 0 is treated as 1.
    pub fn new(total: u64, page: u64, per_page: u64, path: &str) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let offset = offset(page, per_page);

        let on_page = total.saturating_sub(offset).min(per_page);
        let (from, to) = if on_page == 0 {
            (None, None)
        } else {
            (Some(offset + 1), Some(offset + on_page))
        };

        let has_more = total > offset.saturating_add(per_page);

        Self {
            current_page: page,
            per_page,
            from,
            to,
            path: path.to_string(),
            first_page_url: page_url(path, 1),
            next_page_url: has_more.then(|| page_url(path, page + 1)),
            prev_page_url: (page > 1).then(|| page_url(path, page - 1)),
        }
    }

    /// Number of items to skip before this page.
    pub fn offset(&self) -> u64 {
        offset(self.current_page, self.per_page)
    }
}

fn offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

fn page_url(path: &str, page: u64) -> String {
    format!("{}?page={}", path, page)
}

/// Resolve a raw `page` query value. Missing, malformed and zero values
/// resolve to the first page.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}

/// A page of items together with its navigation metadata.
///
/// Serializes to the flat envelope clients consume:
/// `current_page`, `data`, `first_page_url`, `from`, `next_page_url`, `path`,
/// `per_page`, `prev_page_url`, `to`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub current_page: u64,
    pub data: Vec<T>,
    pub first_page_url: String,
    pub from: Option<u64>,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: u64,
    pub prev_page_url: Option<String>,
    pub to: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(links: PageLinks, data: Vec<T>) -> Self {
        Self {
            current_page: links.current_page,
            data,
            first_page_url: links.first_page_url,
            from: links.from,
            next_page_url: links.next_page_url,
            path: links.path,
            per_page: links.per_page,
            prev_page_url: links.prev_page_url,
            to: links.to,
        }
    }

    /// Convert the items while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            current_page: self.current_page,
            data: self.data.into_iter().map(f).collect(),
            first_page_url: self.first_page_url,
            from: self.from,
            next_page_url: self.next_page_url,
            path: self.path,
            per_page: self.per_page,
            prev_page_url: self.prev_page_url,
            to: self.to,
        }
    }
}
