//! # blogpress-engine
//!
//! Reconciliation of changed content files into the publication index.
//!
//! Call [`pipeline::run`] to reconcile a list of changed paths against a site,
//! or use [`reconcile`](reconcile::reconcile) directly with your own
//! [`MetadataReader`] and [`Clock`].

pub mod candidates;
pub mod clock;
pub mod diff;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod reconcile;

pub use candidates::{candidate_set, split_candidate_list};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{MetadataError, ReconcileError};
pub use metadata::{FrontmatterReader, MetadataReader};
pub use pipeline::RunReport;
pub use reconcile::{reconcile, Change, Reconciliation};
