//! Logging configuration
//!
//! Consistent tracing setup for controller binaries and tests. Console
//! output by default, with an optional log file for long attach sessions.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logging configuration matching the config file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Enable console logging
    #[serde(default = "default_true")]
    pub console_enabled: bool,

    /// Optional log file path
    #[serde(default)]
    pub file_path: Option<String>,

    /// Include module target
    #[serde(default = "default_true")]
    pub show_target: bool,

    /// Use ANSI colors
    #[serde(default = "default_true")]
    pub ansi_colors: bool,

    /// Log level as string
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_path: None,
            show_target: true,
            ansi_colors: true,
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Verbose configuration for debugging attach and query traffic
    pub fn debug() -> Self {
        Self {
            level: "debug".to_string(),
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    pub fn with_file(mut self, path: &str) -> Self {
        self.file_path = Some(path.to_string());
        self
    }

    /// Parse level string to a tracing Level
    pub fn get_level(&self) -> Level {
        match self.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Initialize logging with the given configuration.
///
/// Can be called multiple times but only the first call installs the
/// global subscriber.
pub fn init_logging(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file = config.file_path.as_ref().and_then(|path| {
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    if let Some(file) = file {
        if config.console_enabled {
            let console_layer = fmt::layer()
                .with_ansi(config.ansi_colors)
                .with_target(config.show_target)
                .with_writer(std::io::stderr);
            let file_layer = fmt::layer()
                .with_ansi(false)
                .with_target(config.show_target)
                .with_writer(file);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init();
        } else {
            let file_layer = fmt::layer()
                .with_ansi(false)
                .with_target(config.show_target)
                .with_writer(file);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .try_init();
        }
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_ansi(config.ansi_colors)
            .with_target(config.show_target)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Initialize debug logging
pub fn init_debug_logging() {
    init_logging(&LogConfig::debug());
}

/// Initialize logging from a TOML config file with a `[logging]` table
pub fn init_logging_from_file(path: &str) -> std::result::Result<(), String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;

    #[derive(Deserialize, Default)]
    struct ConfigWrapper {
        #[serde(default)]
        logging: Option<LogConfig>,
    }

    let wrapper: ConfigWrapper =
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))?;

    init_logging(&wrapper.logging.unwrap_or_default());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert!(config.console_enabled);
        assert!(config.file_path.is_none());
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_log_config_debug() {
        let config = LogConfig::debug();
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_get_level() {
        assert_eq!(LogConfig::default().get_level(), Level::INFO);
        assert_eq!(LogConfig::debug().get_level(), Level::DEBUG);
        assert_eq!(
            LogConfig::default().with_level("trace").get_level(),
            Level::TRACE
        );
        assert_eq!(
            LogConfig::default().with_level("bogus").get_level(),
            Level::INFO
        );
    }

    #[test]
    fn test_log_config_with_file() {
        let config = LogConfig::default().with_file("attach.log");
        assert_eq!(config.file_path.as_deref(), Some("attach.log"));
    }

    #[test]
    fn test_config_toml_parse() {
        let config: LogConfig = toml::from_str("level = \"warn\"").unwrap();
        assert_eq!(config.get_level(), Level::WARN);
        assert!(config.console_enabled);
    }

    #[test]
    fn test_config_serialization() {
        let config = LogConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: LogConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.console_enabled, config.console_enabled);
        assert_eq!(parsed.level, config.level);
    }
}
