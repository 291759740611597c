//! Read-side projections over a loaded index.
//!
//! These back the archive, front page and tag listings; none of them touch
//! the file system.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::PublishedRecord;

/// The `n` most recently created records, newest first. Ties break on slug.
pub fn recent(records: &[PublishedRecord], n: usize) -> Vec<&PublishedRecord> {
    let mut sorted: Vec<&PublishedRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.slug.cmp(&b.slug)));
    sorted.truncate(n);
    sorted
}

/// Every tag in use, with the number of records carrying it.
///
/// A record listing the same tag twice counts once.
pub fn tag_counts(records: &[PublishedRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        let distinct: BTreeSet<&String> = r.tags.iter().collect();
        for tag in distinct {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Records carrying `tag`, in index order.
pub fn with_tag<'a>(records: &'a [PublishedRecord], tag: &str) -> Vec<&'a PublishedRecord> {
    records
        .iter()
        .filter(|r| r.tags.iter().any(|t| t == tag))
        .collect()
}

pub fn find<'a>(records: &'a [PublishedRecord], slug: &str) -> Option<&'a PublishedRecord> {
    records.iter().find(|r| r.slug.as_str() == slug)
}
