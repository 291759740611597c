//! Core library for blogpress: domain types, index persistence, site config and errors.
//!
//! Public API surface:
//! - [`types`]: [`Slug`], [`SourceMetadata`], [`PublishedRecord`]
//! - [`error`]: [`IndexError`], [`ConfigError`]
//! - [`index_store`]: load / init / replace the publication index
//! - [`config`]: `blogpress.yaml`
//! - [`query`]: read-side projections (recent posts, tags)

pub mod config;
pub mod error;
pub mod index_store;
pub mod query;
pub mod types;

pub use config::SiteConfig;
pub use error::{ConfigError, IndexError};
pub use types::{PublishedRecord, Slug, SourceMetadata, Timestamp};
