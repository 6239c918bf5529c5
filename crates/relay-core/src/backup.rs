//! The ordered backup list and the failover cursor policy.
//!
//! Order IS failover priority. The list is a duplicate-free subset of the
//! task's registered driver names; `promote` is how a run moves its
//! resolved driver to the front, and `next_after` is the strictly forward,
//! non-cyclic scan the cascade follows.

use serde::{Deserialize, Serialize};

/// Priority-ordered backup driver names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupList {
    names: Vec<String>,
}

impl BackupList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a name, once. Re-adding an existing name is a no-op.
    pub fn push(&mut self, name: &str) {
        if !self.contains(name) {
            self.names.push(name.to_string());
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.names.retain(|n| n != name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Move `name` to the front, preserving the relative order of the rest.
    ///
    /// No-op unless the list has at least two entries and contains `name`.
    /// Called once per run with the resolved driver name, not per attempt.
    pub fn promote(&mut self, name: &str) {
        if self.names.len() < 2 {
            return;
        }
        if let Some(position) = self.names.iter().position(|n| n == name) {
            let name = self.names.remove(position);
            self.names.insert(0, name);
        }
    }

    /// The next backup to try after `current` failed.
    ///
    /// - empty list -> None
    /// - `current` not in the list -> the first entry (cascade starts fresh
    ///   from the top)
    /// - otherwise the entry after `current`, or None once the scan is
    ///   exhausted — never wraps around, never retries `current` itself
    pub fn next_after(&self, current: &str) -> Option<&str> {
        if self.names.is_empty() {
            return None;
        }
        let Some(position) = self.names.iter().position(|n| n == current) else {
            return self.names.first().map(String::as_str);
        };
        self.names.get(position + 1).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn list(names: &[&str]) -> BackupList {
        let mut list = BackupList::new();
        for name in names {
            list.push(name);
        }
        list
    }

    #[test]
    fn push_is_idempotent() {
        let mut backups = list(&["a", "b"]);
        backups.push("a");
        assert_eq!(backups.names(), ["a", "b"]);
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let mut backups = list(&["a", "b", "c"]);
        backups.remove("b");
        assert_eq!(backups.names(), ["a", "c"]);
    }

    #[rstest]
    #[case::empty(&[], "x", None)]
    #[case::absent_starts_from_top(&["a", "b"], "x", Some("a"))]
    #[case::sole_entry_is_current(&["a"], "a", None)]
    #[case::middle_advances(&["a", "b", "c"], "a", Some("b"))]
    #[case::last_is_exhausted(&["a", "b", "c"], "c", None)]
    fn next_after_is_a_forward_scan(
        #[case] names: &[&str],
        #[case] current: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(list(names).next_after(current), expected);
    }

    #[test]
    fn promote_moves_to_front_preserving_relative_order() {
        let mut backups = list(&["a", "b", "c", "d"]);
        backups.promote("c");
        assert_eq!(backups.names(), ["c", "a", "b", "d"]);
    }

    #[rstest]
    #[case::single_entry(&["a"], "a")]
    #[case::absent_name(&["a", "b"], "x")]
    fn promote_is_a_noop_when_it_cannot_apply(#[case] names: &[&str], #[case] name: &str) {
        let mut backups = list(names);
        let before = backups.clone();
        backups.promote(name);
        assert_eq!(backups, before);
    }
}
