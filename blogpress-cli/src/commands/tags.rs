//! `blogpress tags`: tag usage across published posts.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use blogpress_core::query;

use super::Site;

/// Arguments for `blogpress tags`.
#[derive(Args, Debug)]
pub struct TagsArgs {
    /// Print the counts as a JSON object.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "tag")]
    tag: String,
    #[tabled(rename = "posts")]
    posts: usize,
}

impl TagsArgs {
    pub fn run(self, site: &Site) -> Result<()> {
        let records = site.records()?;
        let counts = query::tag_counts(&records);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&counts).context("failed to serialize tag counts")?
            );
            return Ok(());
        }

        if counts.is_empty() {
            println!("No tags in use.");
            return Ok(());
        }

        let rows: Vec<TagRow> = counts
            .into_iter()
            .map(|(tag, posts)| TagRow { tag, posts })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
