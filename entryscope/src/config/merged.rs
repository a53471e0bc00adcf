use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::{AgentOptions, Config, LogLevel};
use crate::probe::OutputTarget;
use entryscope_protocol::OutputFormat;

/// Final configuration: agent options override the config file, which
/// overrides defaults. Computed once at attach.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub output: OutputTarget,
    pub format: OutputFormat,
    pub enable_logging: bool,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
    /// File the settings were read from, if any
    pub config_source: Option<PathBuf>,
    pub unknown_options: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(AgentOptions::default(), Config::default(), None)
    }
}

impl AgentConfig {
    pub fn new(options: AgentOptions, config: Config, config_source: Option<PathBuf>) -> Self {
        let output = options
            .output
            .unwrap_or_else(|| OutputTarget::parse(&config.output.target));
        let log_file = options
            .log_file
            .or_else(|| config.general.log_file.map(PathBuf::from));

        Self {
            output,
            format: options.format.unwrap_or(config.output.format),
            enable_logging: options
                .enable_logging
                .unwrap_or(config.general.enable_logging),
            log_level: options.log_level.unwrap_or(config.general.log_level),
            log_file,
            config_source,
            unknown_options: options.unknown_keys,
        }
    }

    /// Parse the options string, load the explicit or discovered config
    /// file, and merge
    pub fn resolve(options: Option<&str>) -> Result<Self> {
        let options = AgentOptions::parse(options)?;

        let (config, source) = match &options.config_file {
            Some(path) => (Config::load_with_explicit_path(path)?, Some(path.clone())),
            None => Config::load()?,
        };

        Ok(Self::new(options, config, source))
    }

    /// Log where the settings came from and which option keys were ignored.
    /// Resolution runs before any subscriber exists, so call this once
    /// logging is initialized.
    pub fn log_resolution(&self) {
        match &self.config_source {
            Some(path) => info!("Loaded configuration from: {}", path.display()),
            None => {
                for path in Config::get_config_search_paths() {
                    debug!("Configuration file not found: {}", path.display());
                }
                info!("No configuration file found, using default settings");
            }
        }
        for key in &self.unknown_options {
            warn!("Ignoring unknown agent option '{}'", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{GeneralConfig, OutputConfig};
    use crate::probe::testing::capture_logs;
    use std::io::Write;

    fn file_config() -> Config {
        Config {
            general: GeneralConfig {
                enable_logging: false,
                log_level: LogLevel::Info,
                log_file: Some("/var/log/entryscope.log".to_string()),
            },
            output: OutputConfig {
                target: "stderr".to_string(),
                format: OutputFormat::Json,
            },
        }
    }

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.output, OutputTarget::Stdout);
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.enable_logging);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.log_file, None);
        assert_eq!(config.config_source, None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = AgentConfig::new(AgentOptions::default(), file_config(), None);
        assert_eq!(config.output, OutputTarget::Stderr);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.enable_logging);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/entryscope.log")));
    }

    #[test]
    fn test_options_override_file() {
        let options = AgentOptions::parse(Some("output=stdout,format=text,log=on,log_level=trace")).unwrap();
        let config = AgentConfig::new(options, file_config(), None);
        assert_eq!(config.output, OutputTarget::Stdout);
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.enable_logging);
        assert_eq!(config.log_level, LogLevel::Trace);
        // Not given as an option, so the file's value stands
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/entryscope.log")));
    }

    #[test]
    fn test_resolve_with_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[output]\nformat = \"json\"\ntarget = \"stderr\"\n").unwrap();
        let options = format!("config={},output=stdout", file.path().display());

        let config = AgentConfig::resolve(Some(&options)).unwrap();

        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.output, OutputTarget::Stdout);
        assert_eq!(config.config_source.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_resolve_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = format!("config={}", dir.path().join("nope.toml").display());
        assert!(AgentConfig::resolve(Some(&options)).is_err());
    }

    #[test]
    fn test_log_resolution_reports_source() {
        let config = AgentConfig {
            config_source: Some(PathBuf::from("/etc/entryscope.toml")),
            unknown_options: vec!["verbose".to_string()],
            ..AgentConfig::default()
        };

        let logs = capture_logs(LogLevel::Info, || config.log_resolution());

        assert!(logs.contains("Loaded configuration from: /etc/entryscope.toml"), "{logs}");
        assert!(logs.contains("Ignoring unknown agent option 'verbose'"), "{logs}");
    }

    #[test]
    fn test_log_resolution_without_file() {
        let logs = capture_logs(LogLevel::Info, || AgentConfig::default().log_resolution());
        assert!(logs.contains("No configuration file found, using default settings"), "{logs}");
    }
}
