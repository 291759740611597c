//! Computes the next publication index.
//!
//! ## Merge protocol
//!
//! 1. Copy the candidate set into `remaining`.
//! 2. Walk the current index in stored order:
//!    - slug not in `remaining` → carry the record over verbatim;
//!    - slug in `remaining` → read fresh metadata, then drop the record
//!      (`publish: false`) or refresh it keeping `created`; remove the slug.
//! 3. Whatever is left in `remaining` is new. Visit it in slug order; append a
//!    fresh record for each publish-flagged item, skip the rest.
//!
//! Any metadata failure aborts the whole run: a half-applied merge would
//! leave no record of which candidates were processed.

use std::collections::BTreeSet;

use blogpress_core::{PublishedRecord, Slug};

use crate::clock::Clock;
use crate::error::ReconcileError;
use crate::metadata::MetadataReader;

/// What happened to one slug during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Not a candidate; carried over untouched.
    Kept { slug: Slug },
    /// Candidate still flagged for publishing; `updated` refreshed.
    Updated { slug: Slug, content_changed: bool },
    /// Candidate whose `publish` flag was revoked. Removed from the index.
    Revoked { slug: Slug },
    /// Candidate appearing in the index for the first time.
    Published { slug: Slug },
    /// New candidate not flagged for publishing.
    SkippedDraft { slug: Slug },
}

impl Change {
    pub fn slug(&self) -> &Slug {
        match self {
            Change::Kept { slug }
            | Change::Updated { slug, .. }
            | Change::Revoked { slug }
            | Change::Published { slug }
            | Change::SkippedDraft { slug } => slug,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Change::Kept { .. } => "kept",
            Change::Updated { .. } => "updated",
            Change::Revoked { .. } => "revoked",
            Change::Published { .. } => "published",
            Change::SkippedDraft { .. } => "draft",
        }
    }

    /// `true` for outcomes that alter the index.
    pub fn alters_index(&self) -> bool {
        matches!(
            self,
            Change::Updated { .. } | Change::Revoked { .. } | Change::Published { .. }
        )
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The next index, in merge order.
    pub records: Vec<PublishedRecord>,
    /// One entry per existing record, then one per new candidate.
    pub changes: Vec<Change>,
}

impl Reconciliation {
    pub fn count(&self, label: &str) -> usize {
        self.changes.iter().filter(|c| c.label() == label).count()
    }
}

/// Merge `candidates` into `current`.
///
/// Each candidate triggers exactly one [`MetadataReader::read`]; records whose
/// slug is not a candidate are never read, re-stamped or reordered.
pub fn reconcile(
    current: Vec<PublishedRecord>,
    candidates: &BTreeSet<Slug>,
    reader: &dyn MetadataReader,
    clock: &dyn Clock,
) -> Result<Reconciliation, ReconcileError> {
    let mut remaining = candidates.clone();
    let mut records = Vec::with_capacity(current.len() + remaining.len());
    let mut changes = Vec::with_capacity(current.len() + remaining.len());

    // Existing records.
    for record in current {
        if !remaining.remove(&record.slug) {
            tracing::debug!("'{}' not a candidate; kept", record.slug);
            changes.push(Change::Kept {
                slug: record.slug.clone(),
            });
            records.push(record);
            continue;
        }

        let meta = fetch(reader, &record.slug)?;
        if !meta.publish {
            tracing::info!("revoked '{}' ({})", record.slug, meta.title);
            changes.push(Change::Revoked { slug: record.slug });
            continue;
        }

        let content_changed = !record.content_matches(&meta);
        let next = record.refreshed(meta, clock.now());
        tracing::info!(
            "updated '{}' (content {})",
            next.slug,
            if content_changed { "changed" } else { "unchanged" }
        );
        changes.push(Change::Updated {
            slug: next.slug.clone(),
            content_changed,
        });
        records.push(next);
    }

    // New candidates; BTreeSet iteration is sorted by slug.
    for slug in remaining {
        let meta = fetch(reader, &slug)?;
        if !meta.publish {
            tracing::info!("'{slug}' ({}) isn't marked for publishing; skip", meta.title);
            changes.push(Change::SkippedDraft { slug });
            continue;
        }
        tracing::info!("published '{slug}' ({})", meta.title);
        changes.push(Change::Published { slug: slug.clone() });
        records.push(PublishedRecord::first_publish(slug, meta, clock.now()));
    }

    Ok(Reconciliation { records, changes })
}

fn fetch(
    reader: &dyn MetadataReader,
    slug: &Slug,
) -> Result<blogpress_core::SourceMetadata, ReconcileError> {
    reader
        .read(slug)
        .map_err(|source| ReconcileError::MetadataUnavailable {
            slug: slug.clone(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
