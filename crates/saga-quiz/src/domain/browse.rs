//! Client-side paging over the character listing.
//!
//! The game front-ends show a few cards per page but fetch characters from
//! the server in larger batches, lazily, and remember the last page they were
//! on. `PageBrowser` holds that bookkeeping so every client computes page
//! counts, fetch offsets and page indicators the same way.

use super::listing::Platform;

/// Maximum number of page indicators shown at once.
pub const MAX_INDICATORS: usize = 5;

/// What a client should do after restoring a remembered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restored {
    /// The page now shown.
    pub page: usize,
    /// Whether the remembered page was out of range and must be forgotten.
    pub forget_saved: bool,
}

/// Paging state for one listing screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBrowser {
    per_page: usize,
    loaded: usize,
    total: usize,
    current: usize,
}

impl PageBrowser {
    /// Creates an empty browser showing `per_page` cards per page.
    #[must_use]
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
            loaded: 0,
            total: 0,
            current: 0,
        }
    }

    /// Creates an empty browser sized for `platform`.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        Self::new(platform.cards_per_page())
    }

    /// Records a server response carrying `received` characters and the
    /// listing's `total`.
    pub fn record_fetch(&mut self, received: usize, total: usize) {
        self.loaded += received;
        self.total = total;
    }

    /// Number of characters received so far.
    #[must_use]
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// The page currently shown.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Index range of the loaded characters shown on the current page.
    #[must_use]
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let start = (self.current * self.per_page).min(self.loaded);
        let end = (start + self.per_page).min(self.loaded);
        start..end
    }

    /// Page count, from the server total when known, otherwise from what has
    /// been loaded.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        let count = if self.total > 0 { self.total } else { self.loaded };
        count.div_ceil(self.per_page)
    }

    fn needed_for(&self, page: usize) -> usize {
        (page + 1) * self.per_page
    }

    /// Page numbers to draw as indicators: all of them when there are at most
    /// five, otherwise a window of five around the current page, pinned to
    /// the first or last five near either end.
    #[must_use]
    pub fn visible_indicators(&self) -> Vec<usize> {
        let pages = self.total_pages();
        if pages <= MAX_INDICATORS {
            return (0..pages).collect();
        }
        let last = pages - 1;
        let mut start = self.current.saturating_sub(2);
        let mut end = (self.current + 2).min(last);
        if self.current < 2 {
            end = (MAX_INDICATORS - 1).min(last);
        }
        if self.current + 3 > pages {
            start = pages - MAX_INDICATORS;
        }
        (start..=end).collect()
    }

    /// Moves one page back. Returns the page to remember.
    pub fn prev(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Moves one page forward, staying on the last page. Returns the page to
    /// remember and, when more characters are needed, the offset to fetch.
    pub fn next(&mut self) -> (usize, Option<usize>) {
        let last = self.total_pages().saturating_sub(1);
        self.current = (self.current + 1).min(last);
        (self.current, self.lazy_fetch_offset(self.current))
    }

    /// Jumps straight to `page` (clicking an indicator).
    pub fn jump(&mut self, page: usize) -> usize {
        self.current = page.min(self.total_pages().saturating_sub(1));
        self.current
    }

    /// Offset to fetch when navigating to `page`. The first batch covers
    /// pages 0 and 1, so fetching happens on even pages from 2 on, and only
    /// while the loaded characters fall short of the page.
    #[must_use]
    pub fn lazy_fetch_offset(&self, page: usize) -> Option<usize> {
        let due = page >= 2 && page % 2 == 0;
        (due && self.loaded < self.needed_for(page) && self.loaded < self.total)
            .then_some(self.loaded)
    }

    /// Offset of the next batch required before `page` can be shown, or
    /// `None` once enough is loaded or the listing is exhausted. Clients call
    /// this in a loop while restoring a remembered page.
    #[must_use]
    pub fn restore_fetch_offset(&self, page: usize) -> Option<usize> {
        (self.loaded < self.needed_for(page) && self.loaded < self.total).then_some(self.loaded)
    }

    /// Finishes restoring `saved`. A page beyond the last one resets the
    /// browser to page 0 and the remembered value must be cleared.
    pub fn finish_restore(&mut self, saved: usize) -> Restored {
        let pages = self.total_pages();
        if pages > 0 && saved >= pages {
            self.current = 0;
            return Restored {
                page: 0,
                forget_saved: true,
            };
        }
        self.current = saved;
        Restored {
            page: saved,
            forget_saved: false,
        }
    }
}
