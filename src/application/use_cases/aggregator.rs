// ============================================================
// AGGREGATOR
// ============================================================
// Frequency views over a working table

use crate::domain::feedback::{DisplaySettings, FrequencyTable, WorkingColumn, WorkingTable};

/// Label of the synthetic row appended to anxiety counts
pub const TOTAL_LABEL: &str = "Total";

/// Read-only frequency views; never mutates the table
pub struct Aggregator<'a> {
    table: &'a WorkingTable,
}

impl<'a> Aggregator<'a> {
    pub fn new(table: &'a WorkingTable) -> Self {
        Self { table }
    }

    /// Occurrences of every keyword across all rows
    pub fn keyword_frequency(&self) -> FrequencyTable {
        FrequencyTable::count(
            self.table
                .rows
                .iter()
                .flat_map(|row| row.keyword_list.iter().map(String::as_str)),
        )
    }

    /// Occurrences of each value of `column`, empty values included
    pub fn attribute_distribution(
        &self,
        column: WorkingColumn,
        limit: Option<usize>,
    ) -> FrequencyTable {
        let counts = FrequencyTable::count(self.table.rows.iter().map(|row| row.value(column)));
        match limit {
            Some(limit) => counts.truncated(limit),
            None => counts,
        }
    }

    /// Non-blank anxiety values followed by a `Total` entry
    pub fn anxiety_counts(&self) -> FrequencyTable {
        let mut counts = FrequencyTable::count(
            self.table
                .rows
                .iter()
                .map(|row| row.fields.customer_anxiety.as_str())
                .filter(|value| !value.trim().is_empty()),
        );
        let total = counts.total();
        counts.push(TOTAL_LABEL, total);
        counts
    }
}

/// Choices for how many top keywords to show: step, 2*step, ... up to the cap
pub fn top_n_options(distinct_keywords: usize, settings: &DisplaySettings) -> Vec<usize> {
    let step = settings.keyword_option_step.max(1);
    let upper = distinct_keywords.min(settings.max_keyword_options);
    (step..=upper).step_by(step).collect()
}
