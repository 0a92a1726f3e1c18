use serde::{Deserialize, Serialize};

use crate::domain::feedback::WorkingRow;

// ============================================================
// DATASET TYPES
// ============================================================

#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub dataset_id: String,
    pub text_column: String,
    pub row_count: usize,
    pub distinct_keywords: usize,
    /// Choices for the top-N keyword selector
    pub top_n_options: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub summary: DatasetSummary,
    pub cached: bool,
    /// False when a newer upload was already on display when this one finished
    pub published: bool,
    pub processing_time_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub file_name: Option<String>,
}

// ============================================================
// AGGREGATION TYPES
// ============================================================

#[derive(Debug, Deserialize)]
pub struct TopNQuery {
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct KeywordOptionsResponse {
    pub top_n_options: Vec<usize>,
    /// Every keyword, most frequent first
    pub keywords: Vec<String>,
}

// ============================================================
// FILTER TYPES
// ============================================================

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct KeywordSearchQuery {
    /// Comma-separated keywords
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct TextSearchQuery {
    pub field: String,
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct FilteredRows<'a> {
    pub total_matches: usize,
    pub returned: usize,
    pub rows: Vec<&'a WorkingRow>,
}

impl<'a> FilteredRows<'a> {
    /// Keep the first `cap` matches for display
    pub fn capped(mut rows: Vec<&'a WorkingRow>, cap: usize) -> Self {
        let total_matches = rows.len();
        rows.truncate(cap);
        Self {
            total_matches,
            returned: rows.len(),
            rows,
        }
    }
}

/// Split comma-separated search input into lowercased keywords
pub fn parse_keyword_input(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}
