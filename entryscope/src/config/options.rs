use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

use crate::config::settings::LogLevel;
use crate::probe::OutputTarget;
use entryscope_protocol::OutputFormat;

/// Settings passed on the agent command line (`-agentpath:lib=key=value,...`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOptions {
    pub output: Option<OutputTarget>,
    pub format: Option<OutputFormat>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
    pub enable_logging: Option<bool>,
    pub config_file: Option<PathBuf>,
    /// Keys that were not recognised; reported once logging is up
    pub unknown_keys: Vec<String>,
}

impl AgentOptions {
    /// Parse `key=value` pairs separated by commas. Empty or missing input
    /// yields defaults.
    pub fn parse(options: Option<&str>) -> Result<Self> {
        let mut parsed = Self::default();
        let Some(options) = options else {
            return Ok(parsed);
        };

        for pair in options.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (pair, ""),
            };

            match key {
                "output" => {
                    parsed.output = Some(OutputTarget::parse(required(key, value)?));
                }
                "format" => {
                    let format = required(key, value)?
                        .parse::<OutputFormat>()
                        .map_err(|e| anyhow!(e))
                        .with_context(|| format!("Option '{key}'"))?;
                    parsed.format = Some(format);
                }
                "log_level" => {
                    let level = LogLevel::from_str(required(key, value)?)
                        .with_context(|| format!("Option '{key}'"))?;
                    parsed.log_level = Some(level);
                }
                "log_file" => {
                    parsed.log_file = Some(PathBuf::from(required(key, value)?));
                }
                "log" => {
                    parsed.enable_logging = Some(parse_switch(key, value)?);
                }
                "config" => {
                    parsed.config_file = Some(PathBuf::from(required(key, value)?));
                }
                _ => parsed.unknown_keys.push(key.to_string()),
            }
        }

        Ok(parsed)
    }
}

fn required<'v>(key: &str, value: &'v str) -> Result<&'v str> {
    if value.is_empty() {
        return Err(anyhow!("Option '{}' requires a value", key));
    }
    Ok(value)
}

fn parse_switch(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(anyhow!(
            "Option '{}' expects on or off, got '{}'",
            key,
            value
        )),
    }
}
