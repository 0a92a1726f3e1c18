// ============================================================
// QUERY ENGINE
// ============================================================
// Row filters over a working table. Results borrow the rows, keep
// the table order and are never capped here.

use crate::domain::feedback::{TextField, WorkingRow, WorkingTable};

pub struct QueryEngine<'a> {
    table: &'a WorkingTable,
}

impl<'a> QueryEngine<'a> {
    pub fn new(table: &'a WorkingTable) -> Self {
        Self { table }
    }

    /// Rows whose keyword list contains `keyword` exactly
    pub fn by_exact_keyword(&self, keyword: &str) -> Vec<&'a WorkingRow> {
        self.filter(|row| row.keyword_list.iter().any(|kw| kw == keyword))
    }

    /// Rows containing at least one of `keywords`, ignoring case
    pub fn by_any_keyword<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<&'a WorkingRow> {
        let wanted: Vec<String> = keywords
            .iter()
            .map(|kw| kw.as_ref().to_lowercase())
            .collect();

        self.filter(|row| {
            row.keyword_list
                .iter()
                .any(|kw| wanted.contains(&kw.to_lowercase()))
        })
    }

    /// Rows whose `field` contains `substring`, ignoring case
    pub fn by_text_contains(&self, field: TextField, substring: &str) -> Vec<&'a WorkingRow> {
        let needle = substring.to_lowercase();
        let column = field.column();

        self.filter(|row| row.value(column).to_lowercase().contains(&needle))
    }

    fn filter<F>(&self, predicate: F) -> Vec<&'a WorkingRow>
    where
        F: Fn(&WorkingRow) -> bool,
    {
        self.table.rows.iter().filter(|row| predicate(*row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::ExtractedFields;

    fn row(issue: &str, actions: &str, keywords: &[&str]) -> WorkingRow {
        WorkingRow {
            fields: ExtractedFields {
                customer_issue: issue.to_string(),
                agent_actions: actions.to_string(),
                ..Default::default()
            },
            keyword_list: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample() -> WorkingTable {
        WorkingTable {
            dataset_id: "test".into(),
            text_column: "thread_text".into(),
            rows: vec![
                row("Card DECLINED at checkout", "Refunded", &["Refund", "card"]),
                row("late delivery", "", &["delivery"]),
                row("", "escalated to card team", &["refund", "escalation"]),
            ],
        }
    }

    #[test]
    fn test_exact_keyword_is_case_sensitive() {
        let table = sample();
        let engine = QueryEngine::new(&table);

        let hits = engine.by_exact_keyword("refund");
        assert_eq!(hits.len(), 1);
        assert!(std::ptr::eq(hits[0], &table.rows[2]));
        assert!(engine.by_exact_keyword("REFUND").is_empty());
    }

    #[test]
    fn test_any_keyword_ignores_case() {
        let table = sample();
        let engine = QueryEngine::new(&table);

        let mixed = engine.by_any_keyword(&["Refund", "REFUND"]);
        let lower = engine.by_any_keyword(&["refund"]);

        assert_eq!(mixed.len(), 2);
        assert_eq!(mixed, lower);
    }

    #[test]
    fn test_any_keyword_is_or_and_ordered() {
        let table = sample();
        let engine = QueryEngine::new(&table);

        let hits = engine.by_any_keyword(&["escalation", "delivery"]);
        assert_eq!(hits.len(), 2);
        assert!(std::ptr::eq(hits[0], &table.rows[1]));
        assert!(std::ptr::eq(hits[1], &table.rows[2]));
    }

    #[test]
    fn test_empty_keyword_list_matches_nothing() {
        let table = sample();
        let none: [&str; 0] = [];
        assert!(QueryEngine::new(&table).by_any_keyword(&none).is_empty());
    }

    #[test]
    fn test_text_contains_ignores_case() {
        let table = sample();
        let engine = QueryEngine::new(&table);

        assert_eq!(
            engine.by_text_contains(TextField::CustomerIssue, "declined").len(),
            1
        );
        assert_eq!(engine.by_text_contains(TextField::AgentActions, "CARD").len(), 1);
    }

    #[test]
    fn test_text_contains_empty_fields_never_match_non_empty() {
        let table = sample();
        let hits = QueryEngine::new(&table).by_text_contains(TextField::AgentActions, "e");

        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| !r.fields.agent_actions.is_empty()));
    }

    #[test]
    fn test_text_contains_empty_substring_matches_all() {
        let table = sample();
        let hits = QueryEngine::new(&table).by_text_contains(TextField::CustomerIssue, "");

        assert_eq!(hits.len(), table.len());
    }

    #[test]
    fn test_regex_characters_are_literal() {
        let table = sample();
        let hits = QueryEngine::new(&table).by_text_contains(TextField::CustomerIssue, "card.*");

        assert!(hits.is_empty());
    }
}
