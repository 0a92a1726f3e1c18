// ============================================================
// FREQUENCY TABLE
// ============================================================
// Label counts ordered by count, ties kept in first-seen order

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Count labels and sort by count descending
    pub fn count<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut positions: HashMap<&'a str, usize> = HashMap::new();
        let mut entries: Vec<FrequencyEntry> = Vec::new();

        for label in labels {
            match positions.get(label) {
                Some(&idx) => entries[idx].count += 1,
                None => {
                    positions.insert(label, entries.len());
                    entries.push(FrequencyEntry {
                        label: label.to_string(),
                        count: 1,
                    });
                }
            }
        }

        // sort_by is stable
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Self { entries }
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.count)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Keep only the first `limit` entries
    pub fn truncated(mut self, limit: usize) -> Self {
        self.entries.truncate(limit);
        self
    }

    pub fn push(&mut self, label: impl Into<String>, count: usize) {
        self.entries.push(FrequencyEntry {
            label: label.into(),
            count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_count_desc() {
        let table = FrequencyTable::count(["a", "b", "b", "c", "b", "c"]);
        assert_eq!(table.labels(), vec!["b", "c", "a"]);
        assert_eq!(table.get("b"), Some(3));
        assert_eq!(table.total(), 6);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let table = FrequencyTable::count(["z", "y", "x", "y", "z", "x"]);
        assert_eq!(table.labels(), vec!["z", "y", "x"]);
    }

    #[test]
    fn test_truncated() {
        let table = FrequencyTable::count(["a", "b", "b"]).truncated(1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.entries()[0].label, "b");
    }

    #[test]
    fn test_empty_labels_counted() {
        let table = FrequencyTable::count(["", "", "Y"]);
        assert_eq!(table.get(""), Some(2));
    }
}
