use crate::record::Record;
use crate::view::View;
use std::sync::Arc;

/// Records delivered per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 2000;

/// Forward-only page cursor over a [`View`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    next: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// A page size of zero is bumped to one
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            next: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index of the page the next call to [`Paginator::next_page`] returns
    pub fn cursor(&self) -> usize {
        self.next
    }

    /// Deliver the next page and advance
    ///
    /// Past the end this returns an empty page and the cursor stays put.
    pub fn next_page(&mut self, view: &View) -> Vec<Arc<Record>> {
        let page = view.page(self.next, self.page_size);
        if !page.is_empty() {
            self.next += 1;
        }
        page
    }

    /// Number of records delivered so far
    pub fn loaded(&self, view: &View) -> usize {
        self.next.saturating_mul(self.page_size).min(view.len())
    }

    pub fn has_more(&self, view: &View) -> bool {
        self.loaded(view) < view.len()
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}
