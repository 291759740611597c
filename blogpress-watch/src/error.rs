use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the watch runtime.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("reconcile error: {0}")]
    Reconcile(#[from] blogpress_engine::ReconcileError),

    #[error("{task} task failed: {reason}")]
    Task { task: &'static str, reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WatchError {
    WatchError::Io {
        path: path.into(),
        source,
    }
}
