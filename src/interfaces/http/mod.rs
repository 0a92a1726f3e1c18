pub mod types;

use actix_cors::Cors;
use actix_web::{delete, dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder, Scope};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::application::use_cases::aggregator::{top_n_options, Aggregator};
use crate::application::{FeedbackExplorer, QueryEngine};
use crate::domain::error::{AppError, Result};
use crate::domain::feedback::{
    DisplaySettings, ExplorerConfig, TextField, WorkingColumn, WorkingTable, EXPORT_FILE_NAME,
};
use crate::infrastructure::feedback::export_csv;

use types::*;

const DEFAULT_UPLOAD_NAME: &str = "upload.csv";
const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

/// Dataset on display and the upload that produced it
#[derive(Default)]
struct CurrentDataset {
    upload_seq: u64,
    table: Option<Arc<WorkingTable>>,
}

pub struct HttpState {
    pub explorer: Arc<FeedbackExplorer>,
    pub display: DisplaySettings,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
    next_upload: AtomicU64,
    current: RwLock<CurrentDataset>,
}

impl HttpState {
    pub fn new(config: &ExplorerConfig, logs: Arc<Mutex<Vec<LogEntry>>>) -> Self {
        Self {
            explorer: Arc::new(FeedbackExplorer::new(config)),
            display: config.display.clone(),
            logs,
            next_upload: AtomicU64::new(0),
            current: RwLock::new(CurrentDataset::default()),
        }
    }

    /// Clone of the current table; readers keep it alive across a new upload
    fn current_table(&self) -> Result<Arc<WorkingTable>> {
        let current = self
            .current
            .read()
            .map_err(|_| AppError::Internal("Dataset lock poisoned".to_string()))?;
        current
            .table
            .clone()
            .ok_or_else(|| AppError::NotFound("No dataset uploaded yet".to_string()))
    }

    /// Sequence number for an upload, in order of arrival
    fn begin_upload(&self) -> u64 {
        self.next_upload.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish the outcome of upload `seq`. Returns false and leaves the
    /// dataset alone when a later upload has already published.
    fn publish(&self, seq: u64, table: Option<Arc<WorkingTable>>) -> Result<bool> {
        let mut current = self
            .current
            .write()
            .map_err(|_| AppError::Internal("Dataset lock poisoned".to_string()))?;
        if seq < current.upload_seq {
            return Ok(false);
        }
        current.upload_seq = seq;
        current.table = table;
        Ok(true)
    }
}

fn summarize(table: &WorkingTable, display: &DisplaySettings) -> DatasetSummary {
    let distinct_keywords = Aggregator::new(table).keyword_frequency().len();
    DatasetSummary {
        dataset_id: table.dataset_id.clone(),
        text_column: table.text_column.clone(),
        row_count: table.len(),
        distinct_keywords,
        top_n_options: top_n_options(distinct_keywords, display),
    }
}

fn error_response(data: &HttpState, source: &str, err: AppError) -> HttpResponse {
    let level = if err.is_client_error() || matches!(err, AppError::NotFound(_)) {
        "WARN"
    } else {
        "ERROR"
    };
    add_log(&data.logs, level, source, &err.to_string());

    match err {
        AppError::NotFound(_) => HttpResponse::NotFound().body(err.to_string()),
        ref e if e.is_client_error() => HttpResponse::BadRequest().body(err.to_string()),
        _ => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[post("/upload")]
async fn upload(
    data: web::Data<HttpState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> impl Responder {
    let file_name = query
        .file_name
        .clone()
        .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());
    let seq = data.begin_upload();

    add_log(
        &data.logs,
        "INFO",
        "Upload",
        &format!("Received {} ({} bytes)", file_name, body.len()),
    );

    match data
        .explorer
        .load_and_process(body.to_vec(), file_name.clone())
        .await
    {
        Ok(processed) => {
            let published = match data.publish(seq, Some(processed.table.clone())) {
                Ok(published) => published,
                Err(e) => return error_response(&data, "Upload", e),
            };
            if !published {
                add_log(
                    &data.logs,
                    "WARN",
                    "Upload",
                    &format!("{} finished after a newer upload; not displayed", file_name),
                );
            }

            let summary = summarize(&processed.table, &data.display);
            add_log(
                &data.logs,
                "INFO",
                "Upload",
                &format!(
                    "Loaded {}: {} rows, {} distinct keywords (cached={})",
                    file_name, summary.row_count, summary.distinct_keywords, processed.cached
                ),
            );

            HttpResponse::Ok().json(UploadResponse {
                summary,
                cached: processed.cached,
                published,
                processing_time_ms: processed.processing_time_ms,
            })
        }
        Err(e) => {
            // Clears the dataset unless a newer upload has already published
            if let Err(clear_err) = data.publish(seq, None) {
                return error_response(&data, "Upload", clear_err);
            }
            error_response(&data, "Upload", e)
        }
    }
}

#[get("/dataset")]
async fn dataset(data: web::Data<HttpState>) -> impl Responder {
    match data.current_table() {
        Ok(table) => HttpResponse::Ok().json(summarize(&table, &data.display)),
        Err(e) => error_response(&data, "Dataset", e),
    }
}

#[get("/keywords")]
async fn keywords(data: web::Data<HttpState>, query: web::Query<TopNQuery>) -> impl Responder {
    match data.current_table() {
        Ok(table) => {
            let frequency = Aggregator::new(&table).keyword_frequency();
            let frequency = match query.top_n {
                Some(top_n) => frequency.truncated(top_n),
                None => frequency,
            };
            HttpResponse::Ok().json(frequency)
        }
        Err(e) => error_response(&data, "Keywords", e),
    }
}

#[get("/keywords/options")]
async fn keyword_options(data: web::Data<HttpState>) -> impl Responder {
    match data.current_table() {
        Ok(table) => {
            let frequency = Aggregator::new(&table).keyword_frequency();
            HttpResponse::Ok().json(KeywordOptionsResponse {
                top_n_options: top_n_options(frequency.len(), &data.display),
                keywords: frequency
                    .labels()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
        }
        Err(e) => error_response(&data, "Keywords", e),
    }
}

#[get("/attributes/{column}")]
async fn attributes(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> impl Responder {
    let column = match WorkingColumn::from_name(&path) {
        Some(column) => column,
        None => {
            return error_response(
                &data,
                "Attributes",
                AppError::ValidationError(format!("Unknown column '{}'", path.as_str())),
            )
        }
    };

    match data.current_table() {
        Ok(table) => {
            let limit = query.limit.unwrap_or(data.display.attribute_top_n);
            HttpResponse::Ok()
                .json(Aggregator::new(&table).attribute_distribution(column, Some(limit)))
        }
        Err(e) => error_response(&data, "Attributes", e),
    }
}

#[get("/anxiety")]
async fn anxiety(data: web::Data<HttpState>) -> impl Responder {
    match data.current_table() {
        Ok(table) => HttpResponse::Ok().json(Aggregator::new(&table).anxiety_counts()),
        Err(e) => error_response(&data, "Anxiety", e),
    }
}

#[get("/rows")]
async fn rows(data: web::Data<HttpState>, query: web::Query<LimitQuery>) -> impl Responder {
    match data.current_table() {
        Ok(table) => {
            let limit = query.limit.unwrap_or(data.display.preview_rows);
            HttpResponse::Ok().json(FilteredRows::capped(table.rows.iter().collect(), limit))
        }
        Err(e) => error_response(&data, "Preview", e),
    }
}

#[get("/filter/keyword")]
async fn filter_keyword(
    data: web::Data<HttpState>,
    query: web::Query<KeywordQuery>,
) -> impl Responder {
    match data.current_table() {
        Ok(table) => {
            let matches = if query.keyword.is_empty() {
                table.rows.iter().collect()
            } else {
                QueryEngine::new(&table).by_exact_keyword(&query.keyword)
            };
            add_log(
                &data.logs,
                "DEBUG",
                "Filter",
                &format!("keyword={} matches={}", query.keyword, matches.len()),
            );
            HttpResponse::Ok().json(FilteredRows::capped(matches, data.display.max_filtered_rows))
        }
        Err(e) => error_response(&data, "Filter", e),
    }
}

#[get("/search/keywords")]
async fn search_keywords(
    data: web::Data<HttpState>,
    query: web::Query<KeywordSearchQuery>,
) -> impl Responder {
    match data.current_table() {
        Ok(table) => {
            let wanted = parse_keyword_input(&query.q);
            let matches = if wanted.is_empty() {
                table.rows.iter().collect()
            } else {
                QueryEngine::new(&table).by_any_keyword(&wanted)
            };
            add_log(
                &data.logs,
                "DEBUG",
                "Search",
                &format!("keywords={} matches={}", wanted.join(", "), matches.len()),
            );
            HttpResponse::Ok().json(FilteredRows::capped(matches, data.display.max_filtered_rows))
        }
        Err(e) => error_response(&data, "Search", e),
    }
}

#[get("/search/text")]
async fn search_text(
    data: web::Data<HttpState>,
    query: web::Query<TextSearchQuery>,
) -> impl Responder {
    let field = match TextField::from_name(&query.field) {
        Some(field) => field,
        None => {
            return error_response(
                &data,
                "Search",
                AppError::ValidationError(format!(
                    "Field '{}' is not searchable; use customer_issue or agent_actions",
                    query.field
                )),
            )
        }
    };

    match data.current_table() {
        Ok(table) => {
            let matches = if query.q.is_empty() {
                table.rows.iter().collect()
            } else {
                QueryEngine::new(&table).by_text_contains(field, &query.q)
            };
            HttpResponse::Ok().json(FilteredRows::capped(matches, data.display.max_filtered_rows))
        }
        Err(e) => error_response(&data, "Search", e),
    }
}

#[get("/download")]
async fn download(data: web::Data<HttpState>) -> impl Responder {
    let table = match data.current_table() {
        Ok(table) => table,
        Err(e) => return error_response(&data, "Download", e),
    };

    match web::block(move || export_csv(&table)).await {
        Ok(Ok(bytes)) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ))
            .body(bytes),
        Ok(Err(e)) => error_response(&data, "Download", e),
        Err(e) => error_response(
            &data,
            "Download",
            AppError::Internal(format!("Export task failed: {}", e)),
        ),
    }
}

#[get("/cache/stats")]
async fn cache_stats(data: web::Data<HttpState>) -> impl Responder {
    HttpResponse::Ok().json(data.explorer.cache_stats())
}

#[delete("/cache")]
async fn clear_cache(data: web::Data<HttpState>) -> impl Responder {
    match data.explorer.clear_cache() {
        Ok(()) => {
            add_log(&data.logs, "INFO", "Cache", "Cleared processed uploads");
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response(&data, "Cache", e),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = match data.logs.lock() {
        Ok(logs) => logs.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    HttpResponse::Ok().json(logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };

    match level {
        "ERROR" => tracing::error!(source, "{}", message),
        "WARN" => tracing::warn!(source, "{}", message),
        "DEBUG" => tracing::debug!(source, "{}", message),
        _ => tracing::info!(source, "{}", message),
    }

    let mut logs = match logs.lock() {
        Ok(logs) => logs,
        Err(poisoned) => poisoned.into_inner(),
    };
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

/// All routes under `/api`
pub fn api_scope(max_upload_bytes: usize) -> Scope {
    web::scope("/api")
        .app_data(web::PayloadConfig::new(max_upload_bytes))
        .service(upload)
        .service(dataset)
        .service(keyword_options)
        .service(keywords)
        .service(attributes)
        .service(anxiety)
        .service(rows)
        .service(filter_keyword)
        .service(search_keywords)
        .service(search_text)
        .service(download)
        .service(cache_stats)
        .service(clear_cache)
        .service(get_logs)
}

pub fn start_server(config: &ExplorerConfig, logs: Arc<Mutex<Vec<LogEntry>>>) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState::new(config, logs));
    let max_upload_bytes = config.ingestion.max_upload_bytes;

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .service(api_scope(max_upload_bytes))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run();

    Ok(server)
}
