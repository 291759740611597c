//! Candidate set builder: changed file paths → deduplicated slugs.

use std::collections::BTreeSet;
use std::path::Path;

use blogpress_core::Slug;

/// Slugs named by `paths`, deduplicated and sorted.
///
/// Each entry contributes its final path component with `extension` removed
/// (only when it is actually a suffix). Entries that leave nothing behind are
/// dropped.
pub fn candidate_set<I, S>(paths: I, extension: &str) -> BTreeSet<Slug>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = BTreeSet::new();
    for raw in paths {
        let raw = raw.as_ref();
        match slug_for_path(raw, extension) {
            Some(slug) => {
                set.insert(slug);
            }
            None => tracing::debug!("ignoring candidate '{raw}': no slug"),
        }
    }
    set
}

/// The slug for one path, or `None` if it would be empty.
pub fn slug_for_path(raw: &str, extension: &str) -> Option<Slug> {
    let base = Path::new(raw.trim()).file_name()?.to_string_lossy();
    let stem = base.strip_suffix(extension).unwrap_or(&*base);
    if stem.is_empty() {
        return None;
    }
    Some(Slug::from(stem))
}

/// Split the comma-delimited list a build tool passes on the command line.
pub fn split_candidate_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
