//! Filter → rank → paginate over one dataset, and the one-way hand-off of
//! the current page to a presenter.

use std::sync::Arc;

use crate::query::{rank_in_place, Criteria, PageView, Pager, Ranked, SearchTerm, SortPolicy};

/// Rows of the current page as handed to a presenter.
#[derive(Debug)]
pub struct PageSnapshot<'a, R> {
    /// Records on the page, in result order.
    pub items: Vec<&'a R>,
    /// Position of the page within the result set.
    pub view: PageView,
    /// Term that produced the result, for highlight markup.
    pub term: &'a SearchTerm,
}

/// Receives page snapshots. Nothing flows back into the core.
pub trait Presenter<R> {
    /// Render `page`.
    fn present(&mut self, page: &PageSnapshot<'_, R>);
}

/// Result set of one dataset view.
///
/// Records are shared and never modified; the view keeps the indices of
/// the matching records in result order plus the page cursor.
#[derive(Debug, Clone)]
pub struct SearchView<R> {
    records: Arc<[R]>,
    matches: Vec<usize>,
    pager: Pager,
    term: SearchTerm,
}

impl<R: Ranked> SearchView<R> {
    /// View showing every record, on page 1.
    pub fn new(records: Arc<[R]>, page_size: usize) -> Self {
        let matches = (0..records.len()).collect();
        Self {
            records,
            matches,
            pager: Pager::new(page_size),
            term: SearchTerm::default(),
        }
    }

    /// Run a new search and go back to page 1.
    pub fn apply<C: Criteria<R>>(&mut self, criteria: &C, policy: SortPolicy) {
        self.evaluate(criteria, policy);
        self.pager.reset();
    }

    /// Re-run the current search after something outside the criteria
    /// changed (such as acquired marks), keeping the page when it still
    /// exists.
    pub fn refilter<C: Criteria<R>>(&mut self, criteria: &C, policy: SortPolicy) {
        self.evaluate(criteria, policy);
        self.pager.clamp(self.matches.len());
    }

    fn evaluate<C: Criteria<R>>(&mut self, criteria: &C, policy: SortPolicy) {
        let records = &self.records;
        self.matches = records
            .iter()
            .enumerate()
            .filter(|(_, record)| criteria.matches(record))
            .map(|(idx, _)| idx)
            .collect();
        if policy == SortPolicy::EffectDescending {
            rank_in_place(&mut self.matches, |idx| records[*idx].rank());
        }
        self.term = criteria.term().clone();
    }

    /// Every record of the dataset.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Number of records in the dataset.
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Number of records in the result set.
    pub fn filtered_len(&self) -> usize {
        self.matches.len()
    }

    /// Records of the result set in order.
    pub fn results(&self) -> impl Iterator<Item = &R> {
        self.matches.iter().map(|idx| &self.records[*idx])
    }

    /// Term of the last search.
    pub fn term(&self) -> &SearchTerm {
        &self.term
    }

    /// Position of the current page.
    pub fn page_view(&self) -> PageView {
        self.pager.view(self.matches.len())
    }

    /// Snapshot of the current page.
    pub fn page(&self) -> PageSnapshot<'_, R> {
        let view = self.page_view();
        PageSnapshot {
            items: self.matches[view.start..view.end]
                .iter()
                .map(|idx| &self.records[*idx])
                .collect(),
            view,
            term: &self.term,
        }
    }

    /// Record at `row` of the current page.
    pub fn row(&self, row: usize) -> Option<&R> {
        let view = self.page_view();
        let idx = view.start.checked_add(row).filter(|idx| *idx < view.end)?;
        self.matches.get(idx).map(|idx| &self.records[*idx])
    }

    /// Jump to `page`; returns false and does nothing when it does not exist.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.pager.go_to(page, self.matches.len())
    }

    /// Next page, if any.
    pub fn next_page(&mut self) -> bool {
        self.pager.next(self.matches.len())
    }

    /// Previous page, if any.
    pub fn previous_page(&mut self) -> bool {
        self.pager.previous(self.matches.len())
    }

    /// Hand the current page to `presenter`.
    pub fn present<P: Presenter<R>>(&self, presenter: &mut P) {
        presenter.present(&self.page());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq)]
    struct Row {
        name: &'static str,
        rank: Option<f64>,
    }

    impl Ranked for Row {
        fn rank(&self) -> Option<f64> {
            self.rank
        }
    }

    struct NameContains(SearchTerm);

    impl Criteria<Row> for NameContains {
        fn term(&self) -> &SearchTerm {
            &self.0
        }

        fn matches(&self, row: &Row) -> bool {
            self.0.matches_any([row.name])
        }
    }

    fn rows() -> Arc<[Row]> {
        vec![
            Row {
                name: "w10",
                rank: Some(10.0),
            },
            Row {
                name: "w50",
                rank: Some(50.0),
            },
            Row {
                name: "misc999",
                rank: None,
            },
        ]
        .into()
    }

    #[derive(Default)]
    struct Recorder(Vec<(Vec<&'static str>, usize)>);

    impl Presenter<Row> for Recorder {
        fn present(&mut self, page: &PageSnapshot<'_, Row>) {
            self.0
                .push((page.items.iter().map(|r| r.name).collect(), page.view.page));
        }
    }

    #[test]
    fn ranks_without_touching_records() {
        let records = rows();
        let mut view = SearchView::new(Arc::clone(&records), 20);
        view.apply(&NameContains(SearchTerm::default()), SortPolicy::EffectDescending);
        let names: Vec<&str> = view.results().map(|r| r.name).collect();
        assert_eq!(names, vec!["w50", "w10", "misc999"]);
        assert_eq!(records[0].name, "w10");

        view.apply(&NameContains(SearchTerm::default()), SortPolicy::Original);
        let names: Vec<&str> = view.results().map(|r| r.name).collect();
        assert_eq!(names, vec!["w10", "w50", "misc999"]);
    }

    #[test]
    fn new_search_resets_page_and_refilter_clamps() {
        let mut view = SearchView::new(rows(), 1);
        assert!(view.go_to_page(3));
        assert!(!view.go_to_page(4));
        assert_eq!(view.page_view().page, 3);

        view.refilter(&NameContains(SearchTerm::new("w")), SortPolicy::Original);
        assert_eq!(view.page_view().page, 2);
        assert_eq!(view.filtered_len(), 2);

        view.apply(&NameContains(SearchTerm::new("w")), SortPolicy::Original);
        assert_eq!(view.page_view().page, 1);
        assert_eq!(view.term().raw(), "w");
        assert_eq!(view.row(0).map(|r| r.name), Some("w10"));
        assert_eq!(view.row(1), None);
    }

    #[test]
    fn presenter_receives_current_page() {
        let mut view = SearchView::new(rows(), 2);
        let mut recorder = Recorder::default();
        view.present(&mut recorder);
        assert!(view.next_page());
        assert!(!view.next_page());
        view.present(&mut recorder);
        assert!(view.previous_page());
        assert_eq!(
            recorder.0,
            vec![(vec!["w10", "w50"], 1), (vec!["misc999"], 2)]
        );
    }
}
