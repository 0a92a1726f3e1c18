// ============================================================
// FEEDBACK INFRASTRUCTURE LAYER
// ============================================================
// Upload reading, transcript parsing and CSV export

mod content_hash;
mod csv_export;
mod keyword_tokenizer;
mod section_extractor;
mod table_reader;

pub use content_hash::sha256_hex;
pub use csv_export::{export_csv, KEYWORD_LIST_HEADER};
pub use keyword_tokenizer::tokenize_keywords;
pub use section_extractor::extract_sections;
pub use table_reader::{decode_lossy, detect_delimiter, LoadedTable, SourceFormat, TableReader};
