// ============================================================
// FEEDBACK EXPLORER USE CASE
// ============================================================
// Orchestrate reading, transcript parsing and caching of uploads

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::application::use_cases::batch_processor::BatchProcessor;
use crate::application::use_cases::table_cache::{TableCache, TableCacheStats};
use crate::domain::error::{AppError, Result};
use crate::domain::feedback::{ExplorerConfig, WorkingTable};
use crate::infrastructure::feedback::{sha256_hex, TableReader};

/// Outcome of loading one upload
#[derive(Debug, Clone)]
pub struct ProcessedUpload {
    pub table: Arc<WorkingTable>,

    /// True when the table came from the cache
    pub cached: bool,

    pub processing_time_ms: u64,
}

pub struct FeedbackExplorer {
    reader: TableReader,
    processor: BatchProcessor,
    cache: Mutex<TableCache>,
}

impl FeedbackExplorer {
    pub fn new(config: &ExplorerConfig) -> Self {
        Self {
            reader: TableReader::from_settings(&config.ingestion),
            processor: BatchProcessor::new(),
            cache: Mutex::new(TableCache::new(config.cache.max_entries)),
        }
    }

    /// Read and parse an upload, reusing the cached table for identical bytes
    pub fn load_and_process_blocking(
        &self,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<ProcessedUpload> {
        let start = Instant::now();
        let dataset_id = sha256_hex(bytes);

        if let Some(table) = self.lock_cache()?.get(&dataset_id) {
            tracing::info!(dataset_id = %dataset_id, file_name, "Reusing processed upload");
            return Ok(ProcessedUpload {
                table,
                cached: true,
                processing_time_ms: start.elapsed().as_millis() as u64,
            });
        }

        tracing::info!(
            dataset_id = %dataset_id,
            file_name,
            bytes = bytes.len(),
            "Processing upload"
        );

        let loaded = self.reader.read(bytes, file_name).map_err(|e| {
            tracing::error!(file_name, error = %e, "Failed to load upload");
            e
        })?;
        tracing::info!(
            rows = loaded.table.row_count(),
            text_column = loaded.text_column_name(),
            "Upload read"
        );

        let table = Arc::new(self.processor.process(&loaded, &dataset_id));
        self.lock_cache()?.put(table.clone());

        Ok(ProcessedUpload {
            table,
            cached: false,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Same as `load_and_process_blocking`, run on the blocking thread pool
    pub async fn load_and_process(
        self: &Arc<Self>,
        bytes: Vec<u8>,
        file_name: String,
    ) -> Result<ProcessedUpload> {
        let explorer = Arc::clone(self);
        tokio::task::spawn_blocking(move || explorer.load_and_process_blocking(&bytes, &file_name))
            .await
            .map_err(|e| AppError::Internal(format!("Upload processing task failed: {}", e)))?
    }

    pub fn cache_stats(&self) -> TableCacheStats {
        match self.cache.lock() {
            Ok(cache) => cache.stats(),
            Err(poisoned) => poisoned.into_inner().stats(),
        }
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.lock_cache()?.clear();
        Ok(())
    }

    fn lock_cache(&self) -> Result<std::sync::MutexGuard<'_, TableCache>> {
        self.cache
            .lock()
            .map_err(|_| AppError::Internal("Table cache lock poisoned".to_string()))
    }
}

impl Default for FeedbackExplorer {
    fn default() -> Self {
        Self::new(&ExplorerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::aggregator::{Aggregator, TOTAL_LABEL};

    const ONE_ROW: &str = "thread_text,vip_flag\n\"<b>Customer Issue:</b> card declined <b>Agent's Actions:</b> refunded amount <b>Customer's Anxiety:</b> high <b>Important Keywords:</b> refund_card_decline\",Y\n";

    #[test]
    fn test_end_to_end_pipeline() {
        let explorer = FeedbackExplorer::default();
        let upload = explorer
            .load_and_process_blocking(ONE_ROW.as_bytes(), "feedback.csv")
            .unwrap();

        assert!(!upload.cached);
        let table = &upload.table;
        assert_eq!(table.len(), 1);
        assert_eq!(table.dataset_id, sha256_hex(ONE_ROW.as_bytes()));

        let aggregator = Aggregator::new(table);
        let keywords = aggregator.keyword_frequency();
        assert_eq!(keywords.len(), 3);
        assert_eq!(keywords.get("refund"), Some(1));
        assert_eq!(keywords.get("card"), Some(1));
        assert_eq!(keywords.get("decline"), Some(1));

        let anxiety = aggregator.anxiety_counts();
        assert_eq!(anxiety.get("high"), Some(1));
        assert_eq!(anxiety.get(TOTAL_LABEL), Some(1));
    }

    #[test]
    fn test_identical_upload_is_cached() {
        let explorer = FeedbackExplorer::default();
        let first = explorer
            .load_and_process_blocking(ONE_ROW.as_bytes(), "a.csv")
            .unwrap();
        let second = explorer
            .load_and_process_blocking(ONE_ROW.as_bytes(), "renamed.csv")
            .unwrap();

        assert!(second.cached);
        assert!(Arc::ptr_eq(&first.table, &second.table));
        assert_eq!(explorer.cache_stats().hits, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let explorer = FeedbackExplorer::default();
        let err = explorer
            .load_and_process_blocking(b"id\n1\n", "no_text.csv")
            .unwrap_err();

        assert!(matches!(err, AppError::MissingColumn(_)));
        assert_eq!(explorer.cache_stats().total_entries, 0);
    }

    #[test]
    fn test_empty_upload() {
        let explorer = FeedbackExplorer::default();
        let err = explorer
            .load_and_process_blocking(b"thread_text\n", "empty.csv")
            .unwrap_err();

        assert!(matches!(err, AppError::EmptyInput(_)));
    }

    #[tokio::test]
    async fn test_async_load() {
        let explorer = Arc::new(FeedbackExplorer::default());
        let upload = explorer
            .load_and_process(ONE_ROW.as_bytes().to_vec(), "feedback.csv".to_string())
            .await
            .unwrap();

        assert_eq!(upload.table.rows[0].vip_flag, "Y");
    }
}
