//! `blogpress posts`: list published posts from the index.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use blogpress_core::{query, PublishedRecord};

use super::{format_timestamp, Site};

/// Arguments for `blogpress posts`.
#[derive(Args, Debug)]
pub struct PostsArgs {
    /// Show a single post.
    #[arg(conflicts_with_all = ["tag", "recent"])]
    pub slug: Option<String>,

    /// Only posts carrying this tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// The newest N posts; N defaults to `recent_count` from the site config.
    #[arg(long, value_name = "N", num_args = 0..=1)]
    pub recent: Option<Option<usize>>,

    /// Print the records as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct PostRow {
    #[tabled(rename = "slug")]
    slug: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "tags")]
    tags: String,
    #[tabled(rename = "created")]
    created: String,
    #[tabled(rename = "updated")]
    updated: String,
}

impl PostsArgs {
    pub fn run(self, site: &Site) -> Result<()> {
        let records = site.records()?;

        if let Some(slug) = &self.slug {
            let record = query::find(&records, slug)
                .with_context(|| format!("no published post with slug '{slug}'"))?;
            return self.print(vec![record]);
        }

        let pool: Vec<PublishedRecord> = match &self.tag {
            Some(tag) => query::with_tag(&records, tag).into_iter().cloned().collect(),
            None => records,
        };
        let selected: Vec<&PublishedRecord> = match self.recent {
            Some(n) => query::recent(&pool, n.unwrap_or(site.config.recent_count)),
            None => pool.iter().collect(),
        };
        self.print(selected)
    }

    fn print(&self, selected: Vec<&PublishedRecord>) -> Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&selected).context("failed to serialize posts")?
            );
            return Ok(());
        }

        if selected.is_empty() {
            println!("No published posts.");
            return Ok(());
        }

        let rows: Vec<PostRow> = selected
            .into_iter()
            .map(|r| PostRow {
                slug: r.slug.to_string(),
                title: r.title.clone(),
                tags: r.tags.join(", "),
                created: format_timestamp(r.created),
                updated: format_timestamp(r.updated),
            })
            .collect();
        let total = rows.len();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!("{}", format!("{total} post(s)").bright_black());
        Ok(())
    }
}
