//! Logging setup / 日志初始化
//!
//! Console output always; a daily-rotated log file when `log_file` is set.
//! `RUST_LOG` overrides the configured level.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Rotated log files kept on disk / 保留的日志文件数
const MAX_LOG_FILES: usize = 5;

/// Map a configured level name to a tracing filter directive / 日志级别映射
pub fn level_directive(level: &str) -> Result<&'static str, String> {
    match level.trim().to_uppercase().as_str() {
        "DEBUG" => Ok("debug"),
        "INFO" => Ok("info"),
        "WARNING" | "WARN" => Ok("warn"),
        "ERROR" | "CRITICAL" => Ok("error"),
        _ => Err(format!("Invalid log level: {}", level)),
    }
}

/// Install the global subscriber. Keep the returned guard alive so buffered
/// file output is flushed on exit.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let directive = level_directive(level).map_err(anyhow::Error::msg)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{directive},tower_http={directive}").into());

    let console_layer = tracing_subscriber::fmt::layer();

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(rolling_appender(path)?);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!("Logging initialized with level {}", level);
    Ok(guard)
}

fn rolling_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "everything_api.log".to_string());

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)?;

    Ok(appender)
}
