//! `blogpress watch`: reconcile on every change under the posts directory.

use anyhow::{Context, Result};
use clap::Args;

use super::Site;

/// Arguments for `blogpress watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {}

impl WatchArgs {
    pub fn run(self, site: Site) -> Result<()> {
        let Site { root, config } = site;
        blogpress_watch::start_blocking(&root, config)
            .with_context(|| format!("watcher stopped for {}", root.display()))
    }
}
