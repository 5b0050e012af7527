use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use everything_search_api::config::AppConfig;
use everything_search_api::search::EverythingSdk;
use everything_search_api::state::AppState;
use everything_search_api::{api, logging};

/// Everything Search API
#[derive(Parser)]
#[command(name = "everything-search-api")]
#[command(about = "HTTP search API over the Everything file index")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Host to bind the server to (overrides config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the server to (overrides config file)
    #[arg(long)]
    port: Option<u16>,

    /// Logging level (overrides config file)
    #[arg(long, value_enum, ignore_case = true)]
    log_level: Option<LogLevel>,

    /// Path to log file (overrides config file)
    #[arg(long)]
    log_file: Option<String>,

    /// Path to Everything64.dll (overrides config file)
    #[arg(long)]
    dll_path: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Load the config file and apply command line overrides / 加载配置并应用命令行参数
///
/// The flag is true when the file did not exist and defaults were written.
fn load_config(args: &Args) -> anyhow::Result<(AppConfig, bool)> {
    let mut config = AppConfig::load(&args.config).map_err(anyhow::Error::msg)?;

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level.as_str().to_string();
    }
    if let Some(log_file) = &args.log_file {
        config.logging.log_file = log_file.clone();
    }
    if let Some(dll_path) = &args.dll_path {
        config.search.dll_path = dll_path.clone();
    }

    // 首次运行时写出默认配置文件
    let created = !args.config.exists();
    if created {
        config.save(&args.config).map_err(anyhow::Error::msg)?;
    }

    Ok((config, created))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

async fn run(config: AppConfig, sdk: EverythingSdk) -> anyhow::Result<()> {
    let bind_addr = config.bind_address();
    let state = Arc::new(AppState::new(config, Box::new(sdk)));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Starting Everything API server on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let (config, created) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = config.get_string("Logging", "level", "INFO");
    let log_file = config.get_string("Logging", "log_file", "");
    let log_path = (!log_file.is_empty()).then(|| PathBuf::from(&log_file));
    let _log_guard = match logging::init_logging(&level, log_path.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        "everything-search-api {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME")
    );
    if created {
        tracing::info!("Created default configuration at {:?}", args.config);
    } else {
        tracing::info!("Loaded configuration from {:?}", args.config);
    }

    let dll_path = config.dll_path();
    if !dll_path.exists() {
        tracing::error!("Everything64.dll not found at {}", dll_path.display());
        return ExitCode::FAILURE;
    }

    let sdk = match EverythingSdk::load(&dll_path) {
        Ok(sdk) => sdk,
        Err(e) => {
            tracing::error!("Failed to initialize Everything SDK: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match sdk.version() {
        Some(version) => tracing::info!("Connected to Everything {}", version),
        None => tracing::warn!("Everything does not appear to be running; searches will fail until it starts"),
    }

    if let Err(e) = run(config, sdk).await {
        tracing::error!("Failed to start server: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_reports_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let path_arg = path.to_string_lossy().into_owned();

        let args = Args::parse_from(["everything-search-api", "--config", &path_arg, "--port", "6000"]);
        let (config, created) = load_config(&args).unwrap();
        assert!(created);
        assert!(path.exists());
        assert_eq!(config.server.port, 6000);

        let args = Args::parse_from(["everything-search-api", "--config", &path_arg, "--log-level", "debug"]);
        let (config, created) = load_config(&args).unwrap();
        assert!(!created);
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.logging.level, "DEBUG");
    }
}
