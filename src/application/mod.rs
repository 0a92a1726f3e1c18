pub mod use_cases;

pub use use_cases::aggregator::Aggregator;
pub use use_cases::batch_processor::BatchProcessor;
pub use use_cases::feedback_explorer::{FeedbackExplorer, ProcessedUpload};
pub use use_cases::query_engine::QueryEngine;
