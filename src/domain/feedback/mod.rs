// ============================================================
// FEEDBACK DOMAIN LAYER
// ============================================================
// Core types for parsed support conversations
// No I/O, no async

mod explorer_config;
mod frequency;
mod raw_table;
mod working_row;

pub use explorer_config::{
    CacheSettings, DisplaySettings, ExplorerConfig, IngestionSettings, ServerSettings,
};
pub use frequency::{FrequencyEntry, FrequencyTable};
pub use raw_table::RawTable;
pub use working_row::{ExtractedFields, TextField, WorkingColumn, WorkingRow, WorkingTable};

/// Pass-through columns copied verbatim from the upload
pub const PASSTHROUGH_COLUMNS: [&str; 4] = [
    "ASP_slab",
    "analytic_business_unit",
    "vip_flag",
    "sub_sub_issue_type",
];

/// Name fragment identifying the free-text column (matched lowercased)
pub const THREAD_TEXT_PATTERN: &str = "thread_text";

/// File name offered for the cleaned export
pub const EXPORT_FILE_NAME: &str = "cleaned_feedback.csv";
