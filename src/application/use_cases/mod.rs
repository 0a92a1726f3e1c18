pub mod aggregator;
pub mod batch_processor;
pub mod feedback_explorer;
pub mod query_engine;
pub mod table_cache;
