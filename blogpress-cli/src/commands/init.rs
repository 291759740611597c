//! `blogpress init`: materialize an empty index.

use anyhow::{Context, Result};
use clap::Args;

use blogpress_core::index_store;

use super::{display_relative, Site};

/// Arguments for `blogpress init`.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, site: &Site) -> Result<()> {
        let path = site.index_path();
        let created = index_store::init_at(&path)
            .with_context(|| format!("failed to initialize index at {}", path.display()))?;
        let shown = display_relative(&site.root, &path);
        if created {
            println!("✓ Initialized empty index at {shown}");
        } else {
            println!("Index already exists at {shown}; left untouched.");
        }
        Ok(())
    }
}
