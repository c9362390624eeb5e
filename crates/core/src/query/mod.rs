//! Search pipeline shared by the item, trade-route and companion views:
//! free-text matching, categorical criteria, ranking and pagination.

mod highlight;
mod page;
mod sort;
mod term;

pub use highlight::{Highlighter, Segment};
pub use page::{paginate, Page, PageView, Pager};
pub use sort::{rank_in_place, sort_records, Ranked, SortPolicy};
pub use term::SearchTerm;

/// Predicate deciding whether a record belongs to a result set.
///
/// Implementations are pure: the answer depends only on the criteria and the
/// record. Every active constraint must hold (logical AND); criteria with no
/// active constraint match every record.
pub trait Criteria<R> {
    /// Free-text term of these criteria, used for highlight markup.
    fn term(&self) -> &SearchTerm;
    /// Whether `record` satisfies every active constraint.
    fn matches(&self, record: &R) -> bool;
}

/// Normalise a dropdown selection: blank means "any".
pub fn selection(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Equality constraint where `None` is the wildcard.
///
/// A record without a value fails any non-wildcard constraint.
pub fn field_matches(selected: Option<&str>, value: Option<&str>) -> bool {
    match selected {
        None => true,
        Some(selected) => value == Some(selected),
    }
}

/// Step through `options` for a cycling selector: none → first → … → last → none.
pub fn cycle_option<T: Clone + PartialEq>(options: &[T], current: Option<&T>) -> Option<T> {
    match current {
        None => options.first().cloned(),
        Some(current) => options
            .iter()
            .position(|option| option == current)
            .and_then(|idx| options.get(idx + 1))
            .cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_selection_is_wildcard() {
        assert_eq!(selection("  "), None);
        assert_eq!(selection(" 북해 ").as_deref(), Some("북해"));
        assert!(field_matches(None, None));
        assert!(!field_matches(Some("a"), None));
        assert!(field_matches(Some("a"), Some("a")));
    }

    #[test]
    fn cycling_wraps_back_to_none() {
        let options = ["a", "b"];
        assert_eq!(cycle_option(&options, None), Some("a"));
        assert_eq!(cycle_option(&options, Some(&"a")), Some("b"));
        assert_eq!(cycle_option(&options, Some(&"b")), None);
        assert_eq!(cycle_option(&options, Some(&"gone")), None);
    }
}
