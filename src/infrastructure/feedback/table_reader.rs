// ============================================================
// TABLE READER
// ============================================================
// Read uploaded CSV or Excel files into memory, every cell as text

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::{ReaderBuilder, Trim};
use encoding_rs::{DecoderResult, UTF_8};
use tracing::{debug, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::feedback::{IngestionSettings, RawTable};

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// Pick the format from the file extension, falling back to magic bytes
    pub fn detect(bytes: &[u8], file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => SourceFormat::Workbook,
            Some("csv") | Some("txt") | Some("tsv") => SourceFormat::Csv,
            _ if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&OLE_MAGIC) => {
                SourceFormat::Workbook
            }
            _ => SourceFormat::Csv,
        }
    }
}

/// An uploaded table with its free-text column located
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: RawTable,
    pub text_column: usize,
}

impl LoadedTable {
    pub fn text_column_name(&self) -> &str {
        &self.table.headers[self.text_column]
    }
}

/// Reader for uploaded conversation exports
pub struct TableReader {
    /// Rows accumulated before each progress log
    chunk_size: usize,

    /// Fragment the free-text column header must contain
    text_column_pattern: String,
}

impl Default for TableReader {
    fn default() -> Self {
        Self::from_settings(&IngestionSettings::default())
    }
}

impl TableReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &IngestionSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size.max(1),
            text_column_pattern: settings.text_column_pattern.to_lowercase(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Read a whole upload and locate its free-text column
    pub fn read(&self, bytes: &[u8], file_name: &str) -> Result<LoadedTable> {
        let table = match SourceFormat::detect(bytes, file_name) {
            SourceFormat::Csv => self.read_csv(bytes)?,
            SourceFormat::Workbook => self.read_workbook(bytes)?,
        };

        if table.is_empty() {
            return Err(AppError::EmptyInput(format!(
                "{} contains no data rows",
                file_name
            )));
        }

        let text_column = self.locate_text_column(&table)?;
        Ok(LoadedTable { table, text_column })
    }

    /// First column whose lowercased header contains the configured fragment
    pub fn locate_text_column(&self, table: &RawTable) -> Result<usize> {
        table
            .find_column_containing(&self.text_column_pattern)
            .ok_or_else(|| {
                AppError::MissingColumn(format!(
                    "no column name contains '{}' (found: {})",
                    self.text_column_pattern,
                    table.headers.join(", ")
                ))
            })
    }

    /// Parse delimited text; invalid byte sequences are dropped
    pub fn read_csv(&self, bytes: &[u8]) -> Result<RawTable> {
        let content = decode_lossy(bytes);
        let delimiter = detect_delimiter(&content);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(Trim::None)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::IoError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(AppError::IoError(
                "No columns to parse from file".to_string(),
            ));
        }

        let headers = name_headers(headers.iter().map(str::to_string));
        let width = headers.len();

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut chunk: Vec<Vec<String>> = Vec::with_capacity(self.chunk_size.min(4096));

        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::IoError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            if record.len() > width {
                return Err(AppError::IoError(format!(
                    "CSV row {} has {} fields, expected {}",
                    index + 1,
                    record.len(),
                    width
                )));
            }

            chunk.push(record.iter().map(str::to_string).collect());

            if chunk.len() >= self.chunk_size {
                rows.append(&mut chunk);
                debug!(rows = rows.len(), "Read CSV chunk");
            }
        }
        rows.append(&mut chunk);

        Ok(RawTable::new(headers, rows))
    }

    /// Read the first worksheet; its first row is the header
    pub fn read_workbook(&self, bytes: &[u8]) -> Result<RawTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| AppError::IoError(format!("Failed to open workbook: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::IoError("No worksheet found".to_string()))?
            .map_err(|e| AppError::IoError(format!("Failed to read worksheet: {}", e)))?;

        let mut sheet_rows = range.rows();
        let headers = match sheet_rows.next() {
            Some(header_row) => name_headers(header_row.iter().map(cell_text)),
            None => {
                return Err(AppError::IoError(
                    "No columns to parse from workbook".to_string(),
                ))
            }
        };

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(range.height().saturating_sub(1));
        for row in sheet_rows {
            rows.push(row.iter().map(cell_text).collect());
            if rows.len() % self.chunk_size == 0 {
                debug!(rows = rows.len(), "Read worksheet chunk");
            }
        }

        Ok(RawTable::new(headers, rows))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Blank headers become `Unnamed: <index>`
fn name_headers<I>(headers: I) -> Vec<String>
where
    I: Iterator<Item = String>,
{
    headers
        .enumerate()
        .map(|(idx, header)| {
            if header.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                header
            }
        })
        .collect()
}

/// Decode UTF-8, stripping a BOM and skipping malformed sequences
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut decoder = UTF_8.new_decoder_with_bom_removal();
    let mut output = String::with_capacity(
        decoder
            .max_utf8_buffer_length_without_replacement(bytes.len())
            .unwrap_or(bytes.len()),
    );

    let mut input = bytes;
    let mut skipped = 0usize;
    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(input, &mut output, true);
        input = &input[read..];
        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::Malformed(_, _) => skipped += 1,
            DecoderResult::OutputFull => {
                let needed = decoder
                    .max_utf8_buffer_length_without_replacement(input.len())
                    .unwrap_or(input.len())
                    .max(16);
                output.reserve(needed);
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "Skipped malformed byte sequences while decoding upload");
    }
    output
}

/// Pick the delimiter that splits the header record into the most fields
/// (comma, semicolon, tab, pipe). Quoted header names are parsed, not counted.
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];

    let mut best_delimiter = b',';
    let mut best_fields = 1usize;

    for &delimiter in &candidates {
        let fields = header_field_count(content, delimiter);
        if fields > best_fields {
            best_fields = fields;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

fn header_field_count(content: &str, delimiter: u8) -> usize {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_simple_csv() {
        let content = "id,thread_text,vip_flag\n1,hello,Y\n2,\"multi\nline, text\",N\n";
        let loaded = TableReader::new().read(content.as_bytes(), "data.csv").unwrap();

        assert_eq!(loaded.table.row_count(), 2);
        assert_eq!(loaded.text_column, 1);
        assert_eq!(loaded.text_column_name(), "thread_text");
        assert_eq!(loaded.table.cell(1, 1), "multi\nline, text");
    }

    #[test]
    fn test_cells_are_not_trimmed_or_typed() {
        let content = "Thread_Text,ASP_slab\n  padded  ,007\n";
        let loaded = TableReader::new().read(content.as_bytes(), "data.csv").unwrap();

        assert_eq!(loaded.table.cell(0, 0), "  padded  ");
        assert_eq!(loaded.table.cell(0, 1), "007");
    }

    #[test]
    fn test_header_only_is_empty_input() {
        let err = TableReader::new()
            .read(b"thread_text,vip_flag\n", "data.csv")
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyInput(_)));
    }

    #[test]
    fn test_blank_file_is_io_error() {
        let err = TableReader::new().read(b"", "data.csv").unwrap_err();
        assert!(matches!(err, AppError::IoError(_)));
    }

    #[test]
    fn test_missing_text_column() {
        let err = TableReader::new()
            .read(b"id,comment\n1,hi\n", "data.csv")
            .unwrap_err();
        assert!(matches!(err, AppError::MissingColumn(_)));
    }

    #[test]
    fn test_overlong_row_is_io_error() {
        let err = TableReader::new()
            .read(b"thread_text\na,b,c\n", "data.csv")
            .unwrap_err();
        assert!(matches!(err, AppError::IoError(_)));
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let mut bytes = b"thread_text\nca".to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(b"fe\n");

        let loaded = TableReader::new().read(&bytes, "data.csv").unwrap();
        assert_eq!(loaded.table.cell(0, 0), "cafe");
    }

    #[test]
    fn test_bom_is_removed() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"thread_text\nhello\n");

        let loaded = TableReader::new().read(&bytes, "data.csv").unwrap();
        assert_eq!(loaded.table.headers[0], "thread_text");
    }

    #[test]
    fn test_semicolon_delimited() {
        let content = "id;thread_text\n1;a, b and c\n";
        let loaded = TableReader::new().read(content.as_bytes(), "data.csv").unwrap();
        assert_eq!(loaded.table.cell(0, 1), "a, b and c");
    }

    #[test]
    fn test_small_chunks_keep_every_row() {
        let mut content = String::from("thread_text\n");
        for i in 0..25 {
            content.push_str(&format!("row {}\n", i));
        }

        let loaded = TableReader::new()
            .with_chunk_size(4)
            .read(content.as_bytes(), "data.csv")
            .unwrap();
        assert_eq!(loaded.table.row_count(), 25);
        assert_eq!(loaded.table.cell(24, 0), "row 24");
    }

    #[test]
    fn test_blank_headers_are_named() {
        let content = "thread_text,\nx,y\n";
        let loaded = TableReader::new().read(content.as_bytes(), "data.csv").unwrap();
        assert_eq!(loaded.table.headers[1], "Unnamed: 1");
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(SourceFormat::detect(b"a,b", "x.CSV"), SourceFormat::Csv);
        assert_eq!(SourceFormat::detect(b"", "x.xlsx"), SourceFormat::Workbook);
        assert_eq!(
            SourceFormat::detect(&[0x50, 0x4B, 0x03, 0x04, 0x00], "upload"),
            SourceFormat::Workbook
        );
        assert_eq!(SourceFormat::detect(b"a,b", "upload"), SourceFormat::Csv);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(detect_delimiter("a\tb\n"), b'\t');
        assert_eq!(detect_delimiter("single\nvalue"), b',');
    }

    #[test]
    fn test_quoted_header_delimiters_are_ignored() {
        let content = "\"notes; a; b; c\",thread_text\nx,hello\n";
        assert_eq!(detect_delimiter(content), b',');

        let loaded = TableReader::new().read(content.as_bytes(), "data.csv").unwrap();
        assert_eq!(loaded.table.headers, vec!["notes; a; b; c", "thread_text"]);
        assert_eq!(loaded.text_column, 1);
        assert_eq!(loaded.table.cell(0, 1), "hello");
    }

    #[test]
    fn test_quoted_comma_in_semicolon_header() {
        let content = "\"id, internal\";thread_text;vip_flag\n1;hi, there;Y\n";
        assert_eq!(detect_delimiter(content), b';');

        let loaded = TableReader::new().read(content.as_bytes(), "data.csv").unwrap();
        assert_eq!(loaded.table.headers[0], "id, internal");
        assert_eq!(loaded.table.cell(0, 1), "hi, there");
    }

    fn sample_workbook() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "id").unwrap();
        sheet.write_string(0, 1, "Thread_Text").unwrap();
        sheet.write_string(0, 2, "vip_flag").unwrap();
        sheet.write_number(1, 0, 7.0).unwrap();
        sheet
            .write_string(1, 1, "<b>Customer Issue:</b> late refund")
            .unwrap();
        sheet.write_string(1, 2, "Y").unwrap();
        sheet.write_number(2, 0, 8.5).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_workbook_first_sheet() {
        let bytes = sample_workbook();
        let loaded = TableReader::new().read(&bytes, "feedback.xlsx").unwrap();

        assert_eq!(loaded.table.headers, vec!["id", "Thread_Text", "vip_flag"]);
        assert_eq!(loaded.text_column, 1);
        assert_eq!(loaded.table.row_count(), 2);
        assert_eq!(loaded.table.cell(0, 0), "7");
        assert_eq!(loaded.table.cell(0, 1), "<b>Customer Issue:</b> late refund");
        assert_eq!(loaded.table.cell(0, 2), "Y");
        assert_eq!(loaded.table.cell(1, 0), "8.5");
        assert_eq!(loaded.table.cell(1, 1), "");
        assert_eq!(loaded.table.cell(1, 2), "");
    }

    #[test]
    fn test_workbook_detected_without_extension() {
        let bytes = sample_workbook();
        let loaded = TableReader::new().read(&bytes, "upload").unwrap();
        assert_eq!(loaded.text_column_name(), "Thread_Text");
    }

    #[test]
    fn test_corrupt_workbook_is_io_error() {
        let err = TableReader::new()
            .read(b"definitely not a workbook", "data.xlsx")
            .unwrap_err();
        assert!(matches!(err, AppError::IoError(_)));
    }
}
