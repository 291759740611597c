//! Dry-run unified diff support for `blogpress diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use blogpress_core::{index_store, SiteConfig};

use crate::candidates::candidate_set;
use crate::clock::Clock;
use crate::error::ReconcileError;
use crate::metadata::MetadataReader;
use crate::pipeline::plan;

/// What a reconciliation run would do to the index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDiff {
    pub path: PathBuf,
    /// Empty when the run would leave every record as it is.
    pub unified_diff: String,
}

impl IndexDiff {
    pub fn is_empty(&self) -> bool {
        self.unified_diff.is_empty()
    }
}

/// Reconcile `paths` against the site at `root` and diff the stored index
/// against what would be written.
///
/// No files are written.
pub fn diff_with(
    root: &Path,
    config: &SiteConfig,
    paths: &[String],
    reader: &dyn MetadataReader,
    clock: &dyn Clock,
) -> Result<IndexDiff, ReconcileError> {
    let path = config.index_path(root);
    let candidates = candidate_set(paths, &config.extension);
    if candidates.is_empty() {
        return Ok(IndexDiff {
            path,
            unified_diff: String::new(),
        });
    }

    let plan = plan(&path, candidates, reader, clock)?;
    if !plan.alters_index() {
        return Ok(IndexDiff {
            path,
            unified_diff: String::new(),
        });
    }

    let existing = normalize_line_endings(&plan.loaded.stored);
    let rendered = index_store::render(&plan.outcome.records)?;

    let relative = path.strip_prefix(root).unwrap_or(path.as_path());
    let old_header = format!("a/{}", relative.display());
    let new_header = format!("b/{}", relative.display());
    let unified = TextDiff::from_lines(&existing, &rendered)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();

    Ok(IndexDiff {
        path,
        unified_diff: unified,
    })
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
