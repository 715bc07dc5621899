use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while rebasing SARIF files.
#[derive(Debug, Error)]
pub(crate) enum RebaseError {
    /// A required setting was not provided on the command line or in the environment.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("root path provided does not exist: {}", .path.display())]
    RootNotFound { path: PathBuf },

    #[error("SARIF file does not exist: {}", .path.display())]
    SarifNotFound { path: PathBuf },

    #[error("failed to parse JSON in {}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but its `$schema` is not a SARIF schema URI.
    #[error("not a SARIF file: {}", .path.display())]
    NotSarif { path: PathBuf },

    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RebaseError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
