/// Records that may carry a rank used by [`SortPolicy::EffectDescending`].
pub trait Ranked {
    /// Rank of this record, or `None` when its category is not ranked.
    fn rank(&self) -> Option<f64> {
        None
    }
}

impl<T: Ranked + ?Sized> Ranked for &T {
    fn rank(&self) -> Option<f64> {
        (**self).rank()
    }
}

/// Secondary ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortPolicy {
    /// Keep the input order.
    #[default]
    Original,
    /// Ranked records by descending rank, ties in input order. Unranked
    /// records keep their positions.
    EffectDescending,
}

/// Order `records` according to `policy`. Stable.
pub fn sort_records<T: Ranked>(records: &mut [T], policy: SortPolicy) {
    match policy {
        SortPolicy::Original => {}
        SortPolicy::EffectDescending => rank_in_place(records, T::rank),
    }
}

/// Reorder only the ranked entries of `items` among the slots they occupy.
///
/// Entries for which `rank` returns `None` are never moved, so they keep
/// their relative (and absolute) order and ranked entries are never
/// interleaved with them. Equal ranks keep their input order.
pub fn rank_in_place<T>(items: &mut [T], rank: impl Fn(&T) -> Option<f64>) {
    let mut slots = Vec::new();
    let mut ranked = Vec::new();
    for (slot, item) in items.iter().enumerate() {
        if let Some(value) = rank(item) {
            slots.push(slot);
            ranked.push((slot, value));
        }
    }
    if ranked.len() < 2 {
        return;
    }

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    // Apply the permutation: ranked[i].0 is the source slot for slots[i].
    let mut order: Vec<usize> = (0..items.len()).collect();
    for (target, (source, _)) in slots.iter().zip(&ranked) {
        order[*target] = *source;
    }
    apply_permutation(items, order);
}

fn apply_permutation<T>(items: &mut [T], mut order: Vec<usize>) {
    // order[i] is the index of the element that must end up at position i.
    for start in 0..items.len() {
        if order[start] == start {
            continue;
        }
        let mut current = start;
        loop {
            let source = order[current];
            order[current] = current;
            if source == start {
                break;
            }
            items.swap(current, source);
            current = source;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        label: &'static str,
        ranked: bool,
        effect: f64,
    }

    impl Ranked for Row {
        fn rank(&self) -> Option<f64> {
            self.ranked.then_some(self.effect)
        }
    }

    fn row(label: &'static str, ranked: bool, effect: f64) -> Row {
        Row {
            label,
            ranked,
            effect,
        }
    }

    fn labels(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|row| row.label).collect()
    }

    #[test]
    fn ranked_rows_sort_descending_before_unranked_neighbours() {
        let mut rows = vec![
            row("w10", true, 10.0),
            row("w50", true, 50.0),
            row("misc", false, 999.0),
        ];
        sort_records(&mut rows, SortPolicy::EffectDescending);
        assert_eq!(labels(&rows), vec!["w50", "w10", "misc"]);
    }

    #[test]
    fn unranked_rows_keep_their_slots() {
        let mut rows = vec![
            row("m1", false, 5.0),
            row("a3", true, 3.0),
            row("m2", false, 100.0),
            row("a9", true, 9.0),
            row("m3", false, 0.0),
        ];
        sort_records(&mut rows, SortPolicy::EffectDescending);
        assert_eq!(labels(&rows), vec!["m1", "a9", "m2", "a3", "m3"]);
    }

    #[test]
    fn equal_ranks_are_stable() {
        let mut rows = vec![
            row("first", true, 7.0),
            row("top", true, 8.0),
            row("second", true, 7.0),
            row("third", true, 7.0),
        ];
        sort_records(&mut rows, SortPolicy::EffectDescending);
        assert_eq!(labels(&rows), vec!["top", "first", "second", "third"]);

        let before = rows.clone();
        sort_records(&mut rows, SortPolicy::EffectDescending);
        assert_eq!(rows, before);
    }

    #[test]
    fn original_policy_is_a_no_op() {
        let mut rows = vec![row("low", true, 1.0), row("high", true, 2.0)];
        sort_records(&mut rows, SortPolicy::Original);
        assert_eq!(labels(&rows), vec!["low", "high"]);
    }

    #[test]
    fn ranks_indices_through_a_lookup() {
        let effects = [Some(1.0), None, Some(4.0), Some(2.0)];
        let mut indices = vec![0usize, 1, 2, 3];
        rank_in_place(&mut indices, |&idx| effects[idx]);
        assert_eq!(indices, vec![2, 1, 3, 0]);
    }
}
