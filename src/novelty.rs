//! Change detection: remembers which titles were already reported.

use std::collections::HashSet;

/// Titles that have already been reported.
///
/// Insert-only: nothing is ever removed, so membership only grows for the
/// lifetime of the set. The title string itself is the identity; no
/// normalization is applied.
#[derive(Debug, Default, Clone)]
pub struct SeenSet {
    titles: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Records unseen titles from `snapshot` and reports each one once.
    ///
    /// `snapshot` is newest-first, as feeds list their items, so it is walked
    /// in reverse: when several articles are new in one cycle, `on_new` sees
    /// the oldest first. Titles already in the set are skipped silently.
    ///
    /// Returns the number of times `on_new` was called.
    ///
    /// # Examples
    ///
    /// ```
    /// use feedwatch::novelty::SeenSet;
    ///
    /// let mut seen = SeenSet::new();
    /// let mut reported = Vec::new();
    /// let snapshot = vec!["C".to_string(), "B".to_string(), "A".to_string()];
    ///
    /// seen.report_new(&snapshot, |title| reported.push(title.to_string()));
    /// assert_eq!(reported, ["A", "B", "C"]);
    ///
    /// // Nothing is reported twice
    /// assert_eq!(seen.report_new(&snapshot, |_| unreachable!()), 0);
    /// ```
    pub fn report_new<F>(&mut self, snapshot: &[String], mut on_new: F) -> usize
    where
        F: FnMut(&str),
    {
        let mut reported = 0;

        for title in snapshot.iter().rev() {
            if self.titles.contains(title.as_str()) {
                continue;
            }
            self.titles.insert(title.clone());
            on_new(title);
            reported += 1;
        }

        reported
    }

    /// Like [`report_new`](Self::report_new), but returns the new titles in
    /// report order (oldest first) instead of calling back.
    pub fn take_new(&mut self, snapshot: &[String]) -> Vec<String> {
        let mut fresh = Vec::new();
        self.report_new(snapshot, |title| fresh.push(title.to_owned()));
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn snapshot(titles: &[&str]) -> Vec<String> {
        titles.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_reports_oldest_first() {
        let mut seen = SeenSet::new();
        assert_eq!(seen.take_new(&snapshot(&["C", "B", "A"])), ["A", "B", "C"]);
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_partial_novelty_skips_seen() {
        let mut seen = SeenSet::new();
        seen.take_new(&snapshot(&["B"]));

        let mut reported = Vec::new();
        let count = seen.report_new(&snapshot(&["C", "B", "A"]), |t| {
            reported.push(t.to_string())
        });

        assert_eq!(reported, ["A", "C"]);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_repeat_snapshot_reports_nothing() {
        let mut seen = SeenSet::new();
        let feed = snapshot(&["Two", "One"]);
        seen.take_new(&feed);

        let mut calls = 0;
        assert_eq!(seen.report_new(&feed, |_| calls += 1), 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_new_items_on_top_of_old_ones() {
        let mut seen = SeenSet::new();
        seen.take_new(&snapshot(&["Two", "One"]));

        let fresh = seen.take_new(&snapshot(&["Four", "Three", "Two", "One"]));
        assert_eq!(fresh, ["Three", "Four"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let mut seen = SeenSet::new();
        assert!(seen.take_new(&[]).is_empty());
        assert!(seen.is_empty());
    }

    #[test]
    fn test_duplicate_within_snapshot_reported_once() {
        let mut seen = SeenSet::new();
        assert_eq!(seen.take_new(&snapshot(&["A", "B", "A"])), ["A", "B"]);
    }

    #[test]
    fn test_titles_are_not_normalized() {
        let mut seen = SeenSet::new();
        let fresh = seen.take_new(&snapshot(&["rust", "Rust", "Rust "]));
        assert_eq!(fresh.len(), 3);
        assert!(seen.contains("Rust "));
        assert!(!seen.contains("RUST"));
    }

    // Untitled items share the "" key, so only the first one is ever reported
    #[test]
    fn test_untitled_items_collapse_to_one_key() {
        let mut seen = SeenSet::new();
        assert_eq!(seen.take_new(&snapshot(&["", "A", ""])), ["", "A"]);
        assert_eq!(seen.take_new(&snapshot(&["", "B"])), ["B"]);
    }

    proptest! {
        #[test]
        fn prop_each_title_reported_at_most_once(
            cycles in prop::collection::vec(
                prop::collection::vec("[a-e]{0,2}", 0..8),
                0..10,
            )
        ) {
            let mut seen = SeenSet::new();
            let mut reported: Vec<String> = Vec::new();

            for cycle in &cycles {
                seen.report_new(cycle, |t| reported.push(t.to_string()));
            }

            let distinct: HashSet<&String> = cycles.iter().flatten().collect();
            let unique: HashSet<&String> = reported.iter().collect();
            prop_assert_eq!(reported.len(), unique.len());
            prop_assert_eq!(unique.len(), distinct.len());
            prop_assert_eq!(seen.len(), distinct.len());
        }

        #[test]
        fn prop_cycle_order_is_reverse_of_first_sightings(
            titles in prop::collection::vec("[a-z]{1,4}", 0..12)
        ) {
            let mut seen = SeenSet::new();
            let fresh = seen.take_new(&titles);

            let mut expected: Vec<String> = Vec::new();
            for t in titles.iter().rev() {
                if !expected.contains(t) {
                    expected.push(t.clone());
                }
            }
            prop_assert_eq!(fresh, expected);
        }
    }
}
