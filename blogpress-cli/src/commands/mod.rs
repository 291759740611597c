pub mod diff;
pub mod init;
pub mod posts;
pub mod reconcile;
pub mod tags;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};

use blogpress_core::{config, index_store, PublishedRecord, SiteConfig, Timestamp};
use blogpress_engine::{split_candidate_list, Clock, FixedClock, SystemClock};

/// Overrides the default site root.
pub const ROOT_ENV: &str = "BLOGPRESS_ROOT";

/// Pins the clock for reproducible builds.
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

/// The site a command operates on.
#[derive(Debug, Clone)]
pub struct Site {
    pub root: PathBuf,
    pub config: SiteConfig,
}

impl Site {
    /// `--root` wins, then `$BLOGPRESS_ROOT`, then `~/blog`.
    pub fn resolve(flag: Option<PathBuf>) -> Result<Self> {
        let root = match flag {
            Some(root) => root,
            None => match std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
                Some(root) => PathBuf::from(root),
                None => config::default_root().context("could not determine site root")?,
            },
        };
        let config = config::load_at(&root)
            .with_context(|| format!("failed to load site config under {}", root.display()))?;
        Ok(Self { root, config })
    }

    pub fn index_path(&self) -> PathBuf {
        self.config.index_path(&self.root)
    }

    /// Load the published records, treating a missing index as empty.
    pub fn records(&self) -> Result<Vec<PublishedRecord>> {
        let path = self.index_path();
        let loaded = index_store::load_at(&path)
            .with_context(|| format!("failed to read index {}", path.display()))?;
        Ok(loaded.records)
    }
}

/// `--now` wins over `$SOURCE_DATE_EPOCH`; otherwise the wall clock.
pub fn clock_from(now: Option<Timestamp>) -> Result<Box<dyn Clock>> {
    if let Some(now) = now {
        return Ok(Box::new(FixedClock(now)));
    }
    match std::env::var(SOURCE_DATE_EPOCH) {
        Ok(raw) if !raw.trim().is_empty() => {
            let secs: Timestamp = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid {SOURCE_DATE_EPOCH} value '{raw}'"))?;
            Ok(Box::new(FixedClock(secs)))
        }
        _ => Ok(Box::new(SystemClock)),
    }
}

/// Flatten repeated `--candidates` values, each possibly comma separated.
pub fn candidate_paths(raw: &[String]) -> Vec<String> {
    raw.iter().flat_map(|list| split_candidate_list(list)).collect()
}

pub fn format_timestamp(ts: Timestamp) -> String {
    match Utc.timestamp_opt(ts, 0).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => ts.to_string(),
    }
}

pub fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_lists_flatten_across_flags() {
        let raw = vec!["a.md, b.md".to_string(), "c.md,".to_string()];
        assert_eq!(candidate_paths(&raw), ["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn explicit_now_pins_the_clock() {
        let clock = clock_from(Some(42)).expect("clock");
        assert_eq!(clock.now(), 42);
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(1_577_836_800), "2020-01-01 00:00");
    }
}
