//! `blogpress diff`: show what `reconcile` would write, without writing.

use anyhow::{Context, Result};
use clap::Args;

use blogpress_core::Timestamp;
use blogpress_engine::{diff::diff_with, FrontmatterReader};

use super::{candidate_paths, clock_from, display_relative, Site};

/// Arguments for `blogpress diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Changed content files, comma separated. May be repeated.
    #[arg(long = "candidates", value_name = "LIST")]
    pub candidates: Vec<String>,

    /// Reconcile as if it were this Unix time.
    #[arg(long, value_name = "SECS")]
    pub now: Option<Timestamp>,
}

impl DiffArgs {
    pub fn run(self, site: &Site) -> Result<()> {
        let paths = candidate_paths(&self.candidates);
        let clock = clock_from(self.now)?;
        let reader = FrontmatterReader::for_site(&site.root, &site.config);

        let diff = diff_with(&site.root, &site.config, &paths, &reader, clock.as_ref())
            .context("diff failed")?;

        if diff.is_empty() {
            println!("No differences for {}.", display_relative(&site.root, &diff.path));
            return Ok(());
        }

        print!("{}", diff.unified_diff);
        if !diff.unified_diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
