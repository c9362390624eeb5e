use std::ops::RangeInclusive;

/// Slice-and-count metadata for one page of results.
///
/// `total_pages` is never below 1, even for an empty result set, and `page`
/// is always within `1..=total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView {
    /// Current page, 1-based.
    pub page: usize,
    /// Maximum number of rows per page.
    pub page_size: usize,
    /// Number of rows across all pages.
    pub total_items: usize,
    /// Number of pages.
    pub total_pages: usize,
    /// Offset of the first row of the page.
    pub start: usize,
    /// Offset one past the last row of the page.
    pub end: usize,
}

impl PageView {
    /// Compute the view for `page`, clamping it into range.
    pub fn new(page: usize, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);
        let start = ((page - 1) * page_size).min(total_items);
        let end = (start + page_size).min(total_items);
        Self {
            page,
            page_size,
            total_items,
            total_pages,
            start,
            end,
        }
    }

    /// Rows on this page.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether this page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether a previous page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether a following page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether `page` names an existing page.
    pub fn contains(&self, page: usize) -> bool {
        (1..=self.total_pages).contains(&page)
    }

    /// Page numbers within `radius` of the current page, clipped to range.
    pub fn window(&self, radius: usize) -> RangeInclusive<usize> {
        let first = self.page.saturating_sub(radius).max(1);
        let last = (self.page + radius).min(self.total_pages);
        first..=last
    }

    /// 1-based numbers of the first and last row on the page, if any.
    pub fn row_range(&self) -> Option<(usize, usize)> {
        if self.is_empty() {
            None
        } else {
            Some((self.start + 1, self.end))
        }
    }
}

/// One page of a result slice.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    /// Rows of the page.
    pub items: &'a [T],
    /// Where the page sits within the result set.
    pub view: PageView,
}

/// Slice `items` into the requested page. Never mutates `items`.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let view = PageView::new(page, page_size, items.len());
    Page {
        items: &items[view.start..view.end],
        view,
    }
}

/// Current-page cursor for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Pager {
    /// Pager on page 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Return to page 1, used whenever criteria change.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Clamp the current page after the result set changed size.
    pub fn clamp(&mut self, total_items: usize) -> PageView {
        let view = self.view(total_items);
        self.page = view.page;
        view
    }

    /// View of the current page for `total_items` rows.
    pub fn view(&self, total_items: usize) -> PageView {
        PageView::new(self.page, self.page_size, total_items)
    }

    /// Jump to `page`; out-of-range requests leave the pager unchanged.
    pub fn go_to(&mut self, page: usize, total_items: usize) -> bool {
        let view = self.view(total_items);
        if !view.contains(page) || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// Advance one page if possible.
    pub fn next(&mut self, total_items: usize) -> bool {
        self.go_to(self.page + 1, total_items)
    }

    /// Go back one page if possible.
    pub fn previous(&mut self, total_items: usize) -> bool {
        match self.page.checked_sub(1) {
            Some(page) => self.go_to(page, total_items),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_one_rows_make_three_pages() {
        let rows: Vec<u32> = (0..41).collect();
        let page = paginate(&rows, 3, 20);
        assert_eq!(page.view.total_pages, 3);
        assert_eq!(page.items, &[40]);
        assert_eq!(page.view.row_range(), Some((41, 41)));
    }

    #[test]
    fn empty_input_has_one_empty_page() {
        let rows: Vec<u32> = Vec::new();
        let page = paginate(&rows, 5, 20);
        assert_eq!(page.view.total_pages, 1);
        assert_eq!(page.view.page, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.view.row_range(), None);
    }

    #[test]
    fn pagination_is_idempotent_and_clamps() {
        let rows: Vec<u32> = (0..45).collect();
        let first = paginate(&rows, 0, 20);
        let second = paginate(&rows, 0, 20);
        assert_eq!(first, second);
        assert_eq!(first.view.page, 1);
        assert_eq!(paginate(&rows, 99, 20).view.page, 3);
        assert_eq!(rows.len(), 45);
    }

    #[test]
    fn out_of_range_goto_is_a_no_op() {
        let mut pager = Pager::new(20);
        assert!(!pager.go_to(0, 41));
        assert!(!pager.go_to(4, 41));
        assert_eq!(pager.page(), 1);
        assert!(pager.go_to(3, 41));
        assert!(!pager.next(41));
        assert_eq!(pager.page(), 3);
        assert!(pager.previous(41));
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn clamp_follows_shrinking_results() {
        let mut pager = Pager::new(10);
        assert!(pager.go_to(5, 50));
        let view = pager.clamp(12);
        assert_eq!(view.page, 2);
        assert_eq!(pager.page(), 2);
        assert_eq!((view.start, view.end), (10, 12));
    }

    #[test]
    fn window_is_clipped_to_range() {
        assert_eq!(PageView::new(1, 10, 100).window(2), 1..=3);
        assert_eq!(PageView::new(5, 10, 100).window(2), 3..=7);
        assert_eq!(PageView::new(10, 10, 100).window(2), 8..=10);
        assert_eq!(PageView::new(1, 10, 0).window(2), 1..=1);
    }
}
