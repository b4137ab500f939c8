use std::num::NonZeroUsize;

/// Page windowing over a list, one instance per surface.
///
/// Pages are 1-based. Navigation clamps to `[1, total_pages]` and never wraps.
/// Going back to the first page when the underlying list changes is up to
/// the caller; a page left out of range is clamped on the next [`window`].
///
/// [`window`]: Paginator::window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    current_page: usize,
    total_items: usize,
    page_size: NonZeroUsize,
}

/// One page of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a, T> {
    /// Items on this page.
    pub items: &'a [T],
    /// Index of the first item of this page within the list.
    pub offset: usize,
    /// Current page, 1-based.
    pub current_page: usize,
    /// Total number of pages; `0` for an empty list.
    pub total_pages: usize,
}

impl<'a, T> Window<'a, T> {
    /// Returns whether navigation controls are worth showing.
    pub fn has_navigation(&self) -> bool {
        self.total_pages > 1
    }

    /// Returns whether there is a previous page.
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Returns whether there is a next page.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Iterate over the items with their 1-based position in the list,
    /// counting from `base`.
    pub fn numbered(&self, base: usize) -> impl Iterator<Item = (usize, &'a T)> + 'a {
        let start = base + self.offset;
        self.items
            .iter()
            .enumerate()
            .map(move |(idx, item)| (start + idx + 1, item))
    }
}

impl Paginator {
    /// Create a paginator on page 1 with no items.
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            current_page: 1,
            total_items: 0,
            page_size,
        }
    }

    /// Set the list length and page size. The current page is kept as is.
    pub fn configure(&mut self, total_items: usize, page_size: NonZeroUsize) {
        self.total_items = total_items;
        self.page_size = page_size;
    }

    /// Get the page size.
    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Get the configured list length.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Total number of pages.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size.get())
    }

    /// Current page, clamped to the configured list.
    pub fn current_page(&self) -> usize {
        self.current_page.clamp(1, self.total_pages().max(1))
    }

    /// Move to the next page unless already on the last one.
    pub fn next(&mut self) {
        let current = self.current_page();
        self.current_page = if current < self.total_pages() {
            current + 1
        } else {
            current
        };
    }

    /// Move to the previous page unless already on the first one.
    pub fn previous(&mut self) {
        self.current_page = self.current_page().saturating_sub(1).max(1);
    }

    /// Jump to a page, clamped.
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages().max(1));
    }

    /// Go back to page 1.
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Get the current page of `source`.
    ///
    /// The list length is taken from `source`, and the current page is
    /// clamped to it.
    pub fn window<'a, T>(&mut self, source: &'a [T]) -> Window<'a, T> {
        self.total_items = source.len();
        self.current_page = self.current_page();

        let page_size = self.page_size.get();
        let start = ((self.current_page - 1) * page_size).min(source.len());
        let end = (start + page_size).min(source.len());
        Window {
            items: &source[start..end],
            offset: start,
            current_page: self.current_page,
            total_pages: self.total_pages(),
        }
    }
}
