//! Error types for blogpress-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from index store operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Reading the index file failed for a reason other than "not found".
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The index file exists but is not a JSON array of published records.
    /// Left untouched for manual inspection.
    #[error("index at {path} is unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The index parsed but violates a structural invariant (duplicate or
    /// empty slug, unparsable legacy date).
    #[error("index at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// The atomic replace did not complete; the previous index is intact.
    #[error("failed to write index at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (write path).
    #[error("index serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors loading `blogpress.yaml` or resolving the site root.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`, so `~/blog` cannot be located.
    #[error("cannot determine home directory; set $HOME or pass --root")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> IndexError {
    IndexError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn write_err(path: impl Into<PathBuf>, source: std::io::Error) -> IndexError {
    IndexError::WriteFailed {
        path: path.into(),
        source,
    }
}
