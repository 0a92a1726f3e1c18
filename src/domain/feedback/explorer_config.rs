// ============================================================
// EXPLORER CONFIGURATION
// ============================================================
// Tunable values for ingestion, display caps and caching

use serde::{Deserialize, Serialize};

use super::THREAD_TEXT_PATTERN;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub server: ServerSettings,
    pub ingestion: IngestionSettings,
    pub display: DisplaySettings,
    pub cache: CacheSettings,

    /// tracing-subscriber filter directive (default: "info")
    pub log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    /// Rows accumulated per read chunk (default: 100000)
    pub chunk_size: usize,

    /// Fragment identifying the free-text column, matched lowercased
    pub text_column_pattern: String,

    /// Largest accepted upload body in bytes (default: 512 MiB)
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Rows returned by filter and search endpoints (default: 300)
    pub max_filtered_rows: usize,

    /// Rows returned by the preview endpoint (default: 500)
    pub preview_rows: usize,

    /// Entries per attribute distribution (default: 20)
    pub attribute_top_n: usize,

    /// Upper bound for the top-N keyword choices (default: 200)
    pub max_keyword_options: usize,

    /// Spacing between top-N keyword choices (default: 10)
    pub keyword_option_step: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Processed uploads kept in memory (default: 8)
    pub max_entries: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            ingestion: IngestionSettings::default(),
            display: DisplaySettings::default(),
            cache: CacheSettings::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            chunk_size: 100_000,
            text_column_pattern: THREAD_TEXT_PATTERN.to_string(),
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_filtered_rows: 300,
            preview_rows: 500,
            attribute_top_n: 20,
            max_keyword_options: 200,
            keyword_option_step: 10,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { max_entries: 8 }
    }
}

impl ExplorerConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.server.host.trim().is_empty() {
            return Err("server.host must not be empty".to_string());
        }
        if self.ingestion.chunk_size == 0 {
            return Err("ingestion.chunk_size must be > 0".to_string());
        }
        if self.ingestion.text_column_pattern.trim().is_empty() {
            return Err("ingestion.text_column_pattern must not be empty".to_string());
        }
        if self.ingestion.max_upload_bytes == 0 {
            return Err("ingestion.max_upload_bytes must be > 0".to_string());
        }
        if self.display.keyword_option_step == 0 {
            return Err("display.keyword_option_step must be > 0".to_string());
        }
        if self.cache.max_entries == 0 {
            return Err("cache.max_entries must be > 0".to_string());
        }
        Ok(())
    }
}
