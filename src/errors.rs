use std::path::PathBuf;

use crate::config::ConfigError;
use crate::polymarket::DataClientError;

/// Hard failures of a report run. Delivery problems are not in here: they
/// are reported as a `false` outcome and never abort the run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to fetch positions: {0}")]
    Fetch(#[from] DataClientError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Write {
            path: path.into(),
            source,
        }
    }
}
