//! Configuration management for entryscope
//!
//! Settings come from the agent options string and an optional TOML file.
//! Configuration priority (highest to lowest):
//! 1. Agent options (`key=value,...`)
//! 2. `config=` specified file
//! 3. ./entryscope.toml
//! 4. ~/.entryscope/config.toml

pub mod merged;
pub mod options;
pub mod settings;

pub use merged::AgentConfig;
pub use options::AgentOptions;
pub use settings::{Config, LogLevel};
