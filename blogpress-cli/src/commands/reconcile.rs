//! `blogpress reconcile`: fold changed content files into the index.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use blogpress_core::Timestamp;
use blogpress_engine::{pipeline, Change, RunReport};

use super::{candidate_paths, clock_from, display_relative, Site};

/// Arguments for `blogpress reconcile`.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Changed content files, comma separated. May be repeated.
    #[arg(long = "candidates", value_name = "LIST")]
    pub candidates: Vec<String>,

    /// Report what would change without writing the index.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Reconcile as if it were this Unix time.
    #[arg(long, value_name = "SECS")]
    pub now: Option<Timestamp>,
}

#[derive(Serialize)]
struct ReportJson {
    index: String,
    dry_run: bool,
    initialized: bool,
    written: bool,
    records: usize,
    changes: Vec<ChangeJson>,
}

#[derive(Serialize)]
struct ChangeJson {
    slug: String,
    change: &'static str,
}

impl ReconcileArgs {
    pub fn run(self, site: &Site) -> Result<()> {
        let paths = candidate_paths(&self.candidates);
        let clock = clock_from(self.now)?;

        let report = pipeline::run(
            &site.root,
            &site.config,
            &paths,
            self.dry_run,
            clock.as_ref(),
        )
        .context("reconcile failed")?;

        if self.json {
            print_json(site, &report)
        } else {
            print_summary(site, &report);
            Ok(())
        }
    }
}

fn print_json(site: &Site, report: &RunReport) -> Result<()> {
    let payload = ReportJson {
        index: display_relative(&site.root, &report.index_path),
        dry_run: report.dry_run,
        initialized: report.initialized,
        written: report.written,
        records: report.records,
        changes: report
            .changes
            .iter()
            .map(|c| ChangeJson {
                slug: c.slug().to_string(),
                change: c.label(),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize run report")?
    );
    Ok(())
}

fn print_summary(site: &Site, report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let index = display_relative(&site.root, &report.index_path);

    if report.candidates.is_empty() {
        println!("{prefix}✓ no candidates; {index} left untouched");
        return;
    }

    let touched: Vec<&Change> = report.touched().collect();
    let altering = touched.iter().filter(|c| c.alters_index()).count();
    if altering == 0 {
        println!(
            "{prefix}✓ {index} unchanged ({} candidate(s), {} record(s))",
            report.candidates.len(),
            report.records
        );
    } else {
        let verb = if report.dry_run { "would update" } else { "updated" };
        println!("{prefix}✓ {verb} {index} ({altering} change(s), {} record(s))", report.records);
    }
    for change in touched {
        println!(
            "  {} {:<24} {}",
            marker(change),
            change.slug().as_str(),
            change.label()
        );
    }
}

fn marker(change: &Change) -> String {
    match change {
        Change::Published { .. } => "+".green().bold().to_string(),
        Change::Updated { .. } => "~".yellow().bold().to_string(),
        Change::Revoked { .. } => "-".red().bold().to_string(),
        Change::SkippedDraft { .. } | Change::Kept { .. } => "·".bright_black().to_string(),
    }
}
