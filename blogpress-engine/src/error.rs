//! Error types for blogpress-engine.

use std::path::PathBuf;

use thiserror::Error;

use blogpress_core::{IndexError, Slug};

/// Failure to obtain fresh front-matter for a content item.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// No content file exists for the slug.
    #[error("no content file for '{slug}' at {path}")]
    NotFound { slug: Slug, path: PathBuf },

    /// The content file exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The front-matter block is not valid YAML for [`SourceMetadata`].
    ///
    /// [`SourceMetadata`]: blogpress_core::SourceMetadata
    #[error("failed to parse front matter in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The `+++` front-matter block is not valid TOML for [`SourceMetadata`].
    ///
    /// [`SourceMetadata`]: blogpress_core::SourceMetadata
    #[error("failed to parse TOML front matter in {path}: {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An opening `---` or `+++` with no matching closing fence.
    #[error("unterminated front matter in {path}")]
    Unterminated { path: PathBuf },
}

/// All errors that can abort a reconciliation run. None are recovered: the
/// index on disk stays exactly as it was before the run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Loading, initializing or replacing the index failed.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// A candidate's source could not be located or parsed.
    #[error("metadata unavailable for '{slug}': {source}")]
    MetadataUnavailable {
        slug: Slug,
        #[source]
        source: MetadataError,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MetadataError {
    MetadataError::Io {
        path: path.into(),
        source,
    }
}
