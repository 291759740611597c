//! Blogpress: keeps a blog's publication index in step with its sources.
//!
//! # Usage
//!
//! ```text
//! blogpress [--root <dir>] init
//! blogpress [--root <dir>] reconcile --candidates a.md,b.md [--dry-run] [--json]
//! blogpress [--root <dir>] diff --candidates a.md,b.md
//! blogpress [--root <dir>] posts [<slug>] [--tag <tag>] [--recent [<n>]] [--json]
//! blogpress [--root <dir>] tags [--json]
//! blogpress [--root <dir>] watch
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, init::InitArgs, posts::PostsArgs, reconcile::ReconcileArgs, tags::TagsArgs,
    watch::WatchArgs, Site,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "blogpress",
    version,
    about = "Reconcile a blog's publication index with its content sources",
    long_about = None,
)]
struct Cli {
    /// Site root. Falls back to $BLOGPRESS_ROOT, then ~/blog.
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty index if none exists.
    Init(InitArgs),

    /// Fold changed content files into the publication index.
    Reconcile(ReconcileArgs),

    /// Show a unified diff of what reconcile would write.
    Diff(DiffArgs),

    /// List published posts.
    Posts(PostsArgs),

    /// Show how many published posts carry each tag.
    Tags(TagsArgs),

    /// Watch the posts directory and reconcile on every change.
    Watch(WatchArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Commands::Watch(_) => "info",
        _ => "warn",
    };
    blogpress_watch::init_tracing(default_filter, cli.log_json);

    let site = Site::resolve(cli.root)?;
    match cli.command {
        Commands::Init(args) => args.run(&site),
        Commands::Reconcile(args) => args.run(&site),
        Commands::Diff(args) => args.run(&site),
        Commands::Posts(args) => args.run(&site),
        Commands::Tags(args) => args.run(&site),
        Commands::Watch(args) => args.run(site),
    }
}
