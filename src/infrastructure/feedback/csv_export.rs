// ============================================================
// CSV EXPORT
// ============================================================
// Serialize the working table for download

use csv::WriterBuilder;

use crate::domain::error::{AppError, Result};
use crate::domain::feedback::{WorkingColumn, WorkingTable};

pub const KEYWORD_LIST_HEADER: &str = "Keyword List";

/// Export column order: the four sections, the keyword list, then pass-through columns
fn export_headers() -> Vec<&'static str> {
    let mut headers: Vec<&'static str> = WorkingColumn::ALL[..4].iter().map(|c| c.header()).collect();
    headers.push(KEYWORD_LIST_HEADER);
    headers.extend(WorkingColumn::ALL[4..].iter().map(|c| c.header()));
    headers
}

/// Write the full table as UTF-8 CSV with a header row
pub fn export_csv(table: &WorkingTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(export_headers())?;

    for row in &table.rows {
        let keyword_list = serde_json::to_string(&row.keyword_list)
            .map_err(|e| AppError::Internal(format!("Failed to encode keyword list: {}", e)))?;

        let mut record: Vec<&str> = WorkingColumn::ALL[..4].iter().map(|c| row.value(*c)).collect();
        record.push(&keyword_list);
        record.extend(WorkingColumn::ALL[4..].iter().map(|c| row.value(*c)));

        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV export: {}", e)))
}
