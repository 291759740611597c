//! Domain types for the publication index.
//!
//! Timestamps are Unix seconds (`i64`), the unit the index file stores.
//! All types are serializable via serde; the on-disk index is JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identifier of a content item: its file name minus the extension.
///
/// Used as the join key between candidates and index records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slug(pub String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Slug {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Slug {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Front-matter of a content item, read fresh for every candidate.
///
/// Absent keys fall back to their defaults, so a post whose `publish` line
/// was deleted reads as unpublished.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceMetadata {
    pub title: String,
    pub summary: String,
    /// Display order is meaningful; duplicates are kept.
    pub tags: Vec<String>,
    pub publish: bool,
}

/// One entry of the publication index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedRecord {
    pub slug: Slug,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    /// First appearance in the index. Never rewritten afterwards.
    pub created: Timestamp,
    /// Last reconciliation that touched this record. Always `>= created`.
    pub updated: Timestamp,
}

impl PublishedRecord {
    /// A record appearing in the index for the first time.
    pub fn first_publish(slug: Slug, meta: SourceMetadata, now: Timestamp) -> Self {
        Self {
            slug,
            title: meta.title,
            summary: meta.summary,
            tags: meta.tags,
            created: now,
            updated: now,
        }
    }

    /// Refresh content fields from `meta`, keeping `slug` and `created`.
    ///
    /// A clock that reads earlier than `created` (hand-edited index, skewed
    /// host) is clamped so that `updated >= created` still holds.
    pub fn refreshed(&self, meta: SourceMetadata, now: Timestamp) -> Self {
        Self {
            slug: self.slug.clone(),
            title: meta.title,
            summary: meta.summary,
            tags: meta.tags,
            created: self.created,
            updated: now.max(self.created),
        }
    }

    /// `true` when title, summary and tags match `meta`.
    pub fn content_matches(&self, meta: &SourceMetadata) -> bool {
        self.title == meta.title && self.summary == meta.summary && self.tags == meta.tags
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
