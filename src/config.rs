//! Application configuration module / 应用配置模块
//!
//! Configuration lives in a JSON file with three sections (`server`, `search`,
//! `logging`). Missing keys fall back to defaults; the binary writes a default
//! file on first run.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Default DLL file name, resolved next to the executable / 默认 DLL 文件名
pub const DEFAULT_DLL_NAME: &str = "Everything64.dll";

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Search configuration / 搜索配置
    pub search: SearchConfig,
    /// Logging configuration / 日志配置
    pub logging: LoggingConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default result cap when the request has no `limit` / 默认最大结果数
    pub max_results: i64,
    /// Path to Everything64.dll, empty means next to the executable / DLL 路径
    pub dll_path: String,
}

/// Logging configuration / 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// DEBUG, INFO, WARNING, ERROR or CRITICAL / 日志级别
    pub level: String,
    /// Log file path, empty disables file logging / 日志文件路径
    pub log_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 100,
            dll_path: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            log_file: "everything_api.log".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file, defaults if the file does not exist / 加载配置文件
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to load configuration from {}: {}", path.display(), e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse configuration {}: {}", path.display(), e))
    }

    /// Save configuration to file / 保存配置到文件
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to save configuration to {}: {}", path.display(), e))?;

        Ok(())
    }

    /// Get the server bind address / 获取服务器绑定地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Resolve the Everything DLL path / 获取 DLL 完整路径
    pub fn dll_path(&self) -> PathBuf {
        if !self.search.dll_path.is_empty() {
            return PathBuf::from(&self.search.dll_path);
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DLL_NAME)
    }

    /// Look up `section.key`; section names are case-insensitive ("Search" == "search")
    fn lookup(&self, section: &str, key: &str) -> Option<Value> {
        let tree = serde_json::to_value(self).ok()?;
        tree.get(section.to_lowercase())?.get(key).cloned()
    }

    /// String lookup with fallback / 获取字符串配置
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        match self.lookup(section, key) {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }

    /// Integer lookup with fallback; numeric strings are accepted / 获取整数配置
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        match self.lookup(section, key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Boolean lookup with fallback / 获取布尔配置
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.lookup(section, key) {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => match s.to_lowercase().as_str() {
                "1" | "yes" | "true" | "on" => true,
                "0" | "no" | "false" | "off" => false,
                _ => default,
            },
            _ => default,
        }
    }
}
