use std::io;
use std::path::PathBuf;

/// Errors surfaced by the logging engine.
///
/// Pool exhaustion and encoding overflow are deliberately absent: the first
/// degrades into cooperative retry, the second silently drops the value.
#[derive(Debug, thiserror::Error)]
pub enum ElogError {
    /// A logging call was made while the logger is not `Ready`.
    #[error("logger is not initialized")]
    Uninitialized,

    /// The sink could not be opened, written or reopened.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A rotation step failed. Files renamed before the failure stay renamed.
    #[error("log rotation failed at {}: {source}", path.display())]
    Rotation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The background flush thread could not be started.
    #[error("failed to spawn flush thread: {0}")]
    Spawn(#[source] io::Error),
}

impl ElogError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        ElogError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn rotation(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ElogError::Rotation {
            path: path.into(),
            source,
        }
    }
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, ElogError>;
