//! Shared reconciliation entrypoint used by the CLI and the watcher.
//!
//! One run: candidate set → load index → (materialize `[]` if missing) →
//! reconcile → replace the index if any record changed. Nothing is written
//! unless reconciliation succeeds for every candidate.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use blogpress_core::{
    index_store::{self, LoadedIndex},
    SiteConfig, Slug,
};

use crate::candidates::candidate_set;
use crate::clock::Clock;
use crate::error::ReconcileError;
use crate::metadata::{FrontmatterReader, MetadataReader};
use crate::reconcile::{reconcile, Change, Reconciliation};

/// Outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub index_path: PathBuf,
    pub candidates: Vec<Slug>,
    pub changes: Vec<Change>,
    /// Number of records in the resulting index.
    pub records: usize,
    /// The empty index was materialized during this run.
    pub initialized: bool,
    /// The index file was replaced.
    pub written: bool,
    pub dry_run: bool,
}

impl RunReport {
    fn noop(index_path: PathBuf, dry_run: bool) -> Self {
        Self {
            index_path,
            candidates: Vec::new(),
            changes: Vec::new(),
            records: 0,
            initialized: false,
            written: false,
            dry_run,
        }
    }

    /// Changes other than [`Change::Kept`].
    pub fn touched(&self) -> impl Iterator<Item = &Change> {
        self.changes
            .iter()
            .filter(|c| !matches!(c, Change::Kept { .. }))
    }
}

/// The merge result for a run, before anything is written.
#[derive(Debug)]
pub(crate) struct Plan {
    pub loaded: LoadedIndex,
    pub candidates: BTreeSet<Slug>,
    pub outcome: Reconciliation,
}

impl Plan {
    pub fn alters_index(&self) -> bool {
        self.outcome.records != self.loaded.records
    }
}

pub(crate) fn plan(
    index_path: &Path,
    candidates: BTreeSet<Slug>,
    reader: &dyn MetadataReader,
    clock: &dyn Clock,
) -> Result<Plan, ReconcileError> {
    let loaded = index_store::load_at(index_path)?;
    let outcome = reconcile(loaded.records.clone(), &candidates, reader, clock)?;
    Ok(Plan {
        loaded,
        candidates,
        outcome,
    })
}

/// Run the pipeline for the site at `root` with an explicit reader and clock.
///
/// `paths` are the changed content files as handed over by the build tool.
/// An empty candidate set is a no-op: the index is neither read nor written.
pub fn run_with(
    root: &Path,
    config: &SiteConfig,
    paths: &[String],
    dry_run: bool,
    reader: &dyn MetadataReader,
    clock: &dyn Clock,
) -> Result<RunReport, ReconcileError> {
    let index_path = config.index_path(root);
    let candidates = candidate_set(paths, &config.extension);
    if candidates.is_empty() {
        tracing::info!("no candidates; nothing to reconcile");
        return Ok(RunReport::noop(index_path, dry_run));
    }
    tracing::info!(
        "candidates: {}",
        candidates.iter().map(Slug::as_str).collect::<Vec<_>>().join(", ")
    );

    let plan = plan(&index_path, candidates, reader, clock)?;

    let mut initialized = false;
    let mut written = false;
    if !dry_run {
        if plan.loaded.needs_init {
            initialized = index_store::init_at(&index_path)?;
        }
        if plan.alters_index() {
            index_store::replace_at(&index_path, &plan.outcome.records)?;
            written = true;
        } else {
            tracing::debug!("index unchanged; not rewriting {}", index_path.display());
        }
    } else if plan.alters_index() {
        tracing::info!("[dry-run] would write: {}", index_path.display());
    }

    let Plan {
        candidates,
        outcome,
        ..
    } = plan;
    Ok(RunReport {
        index_path,
        candidates: candidates.into_iter().collect(),
        records: outcome.records.len(),
        changes: outcome.changes,
        initialized,
        written,
        dry_run,
    })
}

/// Run the pipeline reading front matter from the site's posts directory.
pub fn run(
    root: &Path,
    config: &SiteConfig,
    paths: &[String],
    dry_run: bool,
    clock: &dyn Clock,
) -> Result<RunReport, ReconcileError> {
    let reader = FrontmatterReader::for_site(root, config);
    run_with(root, config, paths, dry_run, &reader, clock)
}
