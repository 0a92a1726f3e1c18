// ============================================================
// BATCH PROCESSOR
// ============================================================
// Parse every transcript of an upload into working rows

use std::time::Instant;

use rayon::prelude::*;

use crate::domain::feedback::{WorkingRow, WorkingTable, PASSTHROUGH_COLUMNS};
use crate::infrastructure::feedback::{extract_sections, tokenize_keywords, LoadedTable};

/// Row-parallel transcript parser
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchProcessor;

impl BatchProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Build the working table; row order and row count match the upload
    pub fn process(&self, loaded: &LoadedTable, dataset_id: &str) -> WorkingTable {
        let start = Instant::now();
        let table = &loaded.table;
        let text_column = loaded.text_column;

        let passthrough = PASSTHROUGH_COLUMNS.map(|name| table.column_index(name));
        for (name, index) in PASSTHROUGH_COLUMNS.iter().zip(passthrough.iter()) {
            if index.is_none() {
                tracing::debug!(column = *name, "Pass-through column absent, filling with empty values");
            }
        }

        // Each row reads only its own cells and writes only its own slot
        let rows: Vec<WorkingRow> = table
            .rows
            .par_iter()
            .map(|cells| build_row(cells, text_column, &passthrough))
            .collect();

        let blank_rows = rows.iter().filter(|row| row.fields.is_blank()).count();
        if blank_rows > 0 {
            tracing::debug!(blank_rows, "Rows without any recognizable section");
        }

        tracing::info!(
            rows = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Processed transcripts"
        );

        WorkingTable {
            dataset_id: dataset_id.to_string(),
            text_column: loaded.text_column_name().to_string(),
            rows,
        }
    }
}

fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(String::as_str).unwrap_or("")
}

fn build_row(cells: &[String], text_column: usize, passthrough: &[Option<usize>; 4]) -> WorkingRow {
    let fields = extract_sections(cell(cells, text_column));
    let keyword_list = tokenize_keywords(&fields.important_keywords);
    let passthrough_value = |slot: usize| {
        passthrough[slot]
            .map(|index| cell(cells, index).to_string())
            .unwrap_or_default()
    };

    WorkingRow {
        fields,
        keyword_list,
        asp_slab: passthrough_value(0),
        analytic_business_unit: passthrough_value(1),
        vip_flag: passthrough_value(2),
        sub_sub_issue_type: passthrough_value(3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::feedback::TableReader;

    fn load(content: &str) -> LoadedTable {
        TableReader::new().read(content.as_bytes(), "upload.csv").unwrap()
    }

    #[test]
    fn test_end_to_end_row() {
        let loaded = load(
            "thread_text\n\"<b>Customer Issue:</b> card declined <b>Agent's Actions:</b> refunded amount <b>Customer's Anxiety:</b> high <b>Important Keywords:</b> refund_card_decline\"\n",
        );
        let table = BatchProcessor::new().process(&loaded, "id");

        assert_eq!(table.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.fields.customer_issue, "card declined");
        assert_eq!(row.fields.agent_actions, "refunded amount");
        assert_eq!(row.fields.customer_anxiety, "high");
        assert_eq!(row.keyword_list, vec!["refund", "card", "decline"]);
        assert_eq!(row.vip_flag, "");
        assert_eq!(table.text_column, "thread_text");
        assert_eq!(table.dataset_id, "id");
    }

    #[test]
    fn test_malformed_rows_are_kept() {
        let loaded = load("Thread_Text,vip_flag\nnothing here,Y\n,N\n\"<b>Customer Issue:</b> x\",\n");
        let table = BatchProcessor::new().process(&loaded, "id");

        assert_eq!(table.len(), 3);
        assert!(table.rows.iter().all(|row| row.fields.is_blank()));
        assert!(table.rows.iter().all(|row| row.keyword_list.is_empty()));
    }

    #[test]
    fn test_passthrough_columns_copied_in_order() {
        let mut content = String::from("id,thread_text,ASP_slab,analytic_business_unit,vip_flag,sub_sub_issue_type\n");
        for i in 0..200 {
            content.push_str(&format!(
                "{i},\"<b>Important Keywords:</b> kw{i}\",slab{i},unit{i},Y,issue{i}\n"
            ));
        }
        let table = BatchProcessor::new().process(&load(&content), "id");

        assert_eq!(table.len(), 200);
        for (i, row) in table.rows.iter().enumerate() {
            assert_eq!(row.keyword_list, vec![format!("kw{i}")]);
            assert_eq!(row.asp_slab, format!("slab{i}"));
            assert_eq!(row.analytic_business_unit, format!("unit{i}"));
            assert_eq!(row.vip_flag, "Y");
            assert_eq!(row.sub_sub_issue_type, format!("issue{i}"));
        }
    }

    #[test]
    fn test_short_rows_fill_passthrough_with_empty() {
        let loaded = load("thread_text,vip_flag\nhello\n");
        let table = BatchProcessor::new().process(&loaded, "id");

        assert_eq!(table.rows[0].vip_flag, "");
    }
}
