use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::ConfigService;
use crate::interfaces::http::{add_log, start_server};

/// Load configuration, install logging and serve the explorer API until shutdown
pub async fn run() -> std::io::Result<()> {
    let config_service = ConfigService::new();
    let config = match config_service.load() {
        Ok(config) => config,
        Err(e) => {
            let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
            tracing::error!(path = %config_service.path().display(), "{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let logs = Arc::new(Mutex::new(Vec::new()));
    add_log(
        &logs,
        "INFO",
        "System",
        &format!(
            "Feedback explorer listening on {}:{}",
            config.server.host, config.server.port
        ),
    );

    start_server(&config, logs)?.await
}
