use std::path::PathBuf;

use entryscope_host::HostError;

/// Reasons attach can fail; each maps to a non-zero load status
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("Invalid agent configuration: {0:#}")]
    Config(anyhow::Error),

    #[error("Cannot open output '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Probe is already attached")]
    AlreadyAttached,
}

pub type Result<T> = std::result::Result<T, AttachError>;
