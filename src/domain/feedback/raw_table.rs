// ============================================================
// RAW TABLE
// ============================================================
// Uploaded rows exactly as read, every cell kept as text

/// In-memory copy of an uploaded table
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Header names in file order
    pub headers: Vec<String>,

    /// Data rows; each row holds at most `headers.len()` cells
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column with exactly this header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First column whose lowercased header contains `pattern`
    pub fn find_column_containing(&self, pattern: &str) -> Option<usize> {
        let pattern = pattern.to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains(&pattern))
    }

    /// Cell text, empty when the row is shorter than the header
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}
