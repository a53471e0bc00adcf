use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use entryscope_protocol::OutputFormat;

pub const CONFIG_FILE_NAME: &str = "entryscope.toml";

/// Log level enumeration for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl LogLevel {
    /// Convert to tracing level filter
    pub fn to_tracing_level_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(anyhow::anyhow!(
                "Invalid log level: {}. Valid options: error, warn, info, debug, trace",
                s
            )),
        }
    }
}

/// Configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default = "default_enable_logging")]
    pub enable_logging: bool,
    #[serde(default)]
    pub log_level: LogLevel,
    /// Operational log destination; stderr when unset
    #[serde(default)]
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// `stdout`, `stderr` or a file path
    #[serde(default = "default_output_target")]
    pub target: String,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_enable_logging() -> bool {
    true
}

fn default_output_target() -> String {
    "stdout".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enable_logging: default_enable_logging(),
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target: default_output_target(),
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// First existing file among the search paths
    pub fn find_config_file() -> Option<PathBuf> {
        for path in Self::get_config_search_paths() {
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Load the discovered file, or defaults when there is none
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        match Self::find_config_file() {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            )
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            Self::create_friendly_toml_error(&path.display().to_string(), &content, e)
        })?;

        Ok(config)
    }

    /// Load configuration named by the `config=` option
    pub fn load_with_explicit_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Specified configuration file does not exist: {}",
                path.display()
            ));
        }
        Self::load_from_file(path)
    }

    /// Create a user-friendly error message for TOML parsing errors
    fn create_friendly_toml_error(
        file_path: &str,
        content: &str,
        error: toml::de::Error,
    ) -> anyhow::Error {
        let error_msg = format!("Configuration file parsing error in '{}'", file_path);

        if let Some(span) = error.span() {
            let (line_num, col_num) = Self::line_and_column(content, span.start);
            let context_line = content.lines().nth(line_num.saturating_sub(1)).unwrap_or("");

            anyhow::anyhow!(
                "{}\n\nError at line {}, column {}:\n{}\n\n{}\n{}^\n\nSuggestion: {}",
                error_msg,
                line_num,
                col_num,
                error.message(),
                context_line,
                " ".repeat(col_num.saturating_sub(1)),
                Self::get_error_suggestion(error.message())
            )
        } else {
            anyhow::anyhow!(
                "{}\n\n{}\n\nSuggestion: {}",
                error_msg,
                error.message(),
                Self::get_error_suggestion(error.message())
            )
        }
    }

    /// 1-based line and column of a byte offset
    fn line_and_column(content: &str, offset: usize) -> (usize, usize) {
        let mut current_pos = 0;
        let mut line_num: usize = 1;

        // Keep each line's own terminator so CRLF files count both bytes
        for line in content.split_inclusive('\n') {
            let line_len = line.len();
            if current_pos + line_len > offset {
                return (line_num, offset - current_pos + 1);
            }
            current_pos += line_len;
            line_num += 1;
        }

        (line_num, 1)
    }

    /// Provide helpful suggestions based on common configuration errors
    fn get_error_suggestion(error_msg: &str) -> &'static str {
        if error_msg.contains("log_level") || error_msg.contains("`trace`") {
            "Valid log levels are: 'error', 'warn', 'info', 'debug', 'trace'"
        } else if error_msg.contains("`json`") || error_msg.contains("format") {
            "Valid output formats are: 'text', 'json'"
        } else if error_msg.contains("unknown field") {
            "Check the field name spelling and ensure it's in the correct section ([general] or [output])"
        } else if error_msg.contains("invalid type") {
            "Check the value type - strings should be in quotes, booleans should not"
        } else {
            "Please check the configuration file syntax"
        }
    }

    /// Configuration file search paths in priority order
    pub fn get_config_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. ./entryscope.toml (project-level config)
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join(CONFIG_FILE_NAME));
        }

        // 2. ~/.entryscope/config.toml (user-level config)
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".entryscope").join("config.toml"));
        }

        paths
    }
}
