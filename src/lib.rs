pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

mod app;

pub use app::run;
pub use application::{Aggregator, BatchProcessor, FeedbackExplorer, ProcessedUpload, QueryEngine};
pub use domain::error::{AppError, Result};
pub use domain::feedback::{ExplorerConfig, FrequencyTable, WorkingColumn, WorkingRow, WorkingTable};
pub use infrastructure::feedback::{export_csv, extract_sections, tokenize_keywords, TableReader};
