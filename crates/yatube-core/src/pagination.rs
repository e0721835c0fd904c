//! Fixed-size pagination for post feeds.
//!
//! A [`Paginator`] turns a total item count and the raw `page` query parameter
//! into a [`PageWindow`]; storage backends use the window's offset and limit to
//! fetch a single page, and [`Page`] carries the fetched items plus the
//! navigation data templates need.
//!
//! Page numbers are 1-based. A missing or non-numeric request yields page 1,
//! numbers below 1 clamp to 1 and numbers past the end clamp to the last page.
//! An empty collection still has one (empty) page.

/// Number of posts shown per feed page.
pub const PAGE_SIZE: u64 = 10;

/// Splits ordered collections into pages of at most `per_page` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages needed for `total` items (never less than one).
    pub fn num_pages(&self, total: u64) -> u64 {
        if total == 0 {
            1
        } else {
            total.div_ceil(self.per_page)
        }
    }

    /// Resolve the requested page against a collection of `total` items.
    pub fn window(&self, requested: Option<&str>, total: u64) -> PageWindow {
        let num_pages = self.num_pages(total);
        PageWindow {
            number: resolve_page_number(requested, num_pages),
            num_pages,
            per_page: self.per_page,
            total,
        }
    }

    /// Slice one page out of an already materialised sequence.
    pub fn paginate<T: Clone>(&self, items: &[T], requested: Option<&str>) -> Page<T> {
        let window = self.window(requested, items.len() as u64);
        let page_items = items
            .iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .cloned()
            .collect();
        Page::new(page_items, window)
    }
}

fn resolve_page_number(requested: Option<&str>, num_pages: u64) -> u64 {
    match requested.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        Some(number) if number > 1 => (number as u64).min(num_pages),
        _ => 1,
    }
}

/// The position of one page inside a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub total: u64,
}

impl PageWindow {
    /// Number of items that precede this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }
}

/// A single page of items.
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    window: PageWindow,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn number(&self) -> u64 {
        self.window.number
    }

    pub fn num_pages(&self) -> u64 {
        self.window.num_pages
    }

    /// Size of the whole collection, not just this page.
    pub fn total(&self) -> u64 {
        self.window.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.window.number < self.window.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.window.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.window.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.window.number - 1)
    }

    /// 1-based index of the first item on this page, 0 for an empty collection.
    pub fn start_index(&self) -> u64 {
        if self.window.total == 0 {
            0
        } else {
            self.window.offset() + 1
        }
    }

    /// 1-based index of the last item on this page.
    pub fn end_index(&self) -> u64 {
        self.window.offset() + self.items.len() as u64
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}
