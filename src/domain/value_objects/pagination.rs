//! Offset pagination.

/// A validated page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Build from a raw `?page=` value. Missing, non-numeric and
    /// non-positive values fall back to the first page.
    pub fn from_query(raw: Option<&str>, page_size: u32) -> Self {
        let page = raw
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .map(|p| p.min(u32::MAX as i64) as u32)
            .unwrap_or(1);
        Self::new(page, page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }
}

/// One page of results plus the totals needed to render navigation.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_items,
        }
    }

    /// `ceil(total_items / page_size)`
    pub fn total_pages(&self) -> i64 {
        total_pages(self.total_items, self.page_size)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
        }
    }
}

pub fn total_pages(total_items: i64, page_size: u32) -> i64 {
    if total_items <= 0 {
        return 0;
    }
    let size = page_size.max(1) as i64;
    (total_items + size - 1) / size
}
