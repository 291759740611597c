//! On-disk publication index.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   blogpress.yaml        (optional site config)
//!   published.json        (the index: a JSON array of records)
//! ```
//!
//! Load tolerates a missing file (empty index, `needs_init`) and hand-edited
//! formatting, but never salvages a file it cannot parse. Replace is a
//! whole-file swap: serialize → `<file>.tmp` sibling → `rename`.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, write_err, IndexError};
use crate::types::{PublishedRecord, Slug, Timestamp};

/// The persisted form of an empty index.
pub const EMPTY_INDEX: &str = "[]";

/// Result of [`load_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedIndex {
    pub records: Vec<PublishedRecord>,
    /// The file did not exist; the caller must materialize `[]` before writing.
    pub needs_init: bool,
    /// Raw file text as read (empty when the file is missing).
    pub stored: String,
}

// ---------------------------------------------------------------------------
// Legacy record shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordCompat {
    Stamped(StampedCompat),
    Dated(DatedCompat),
}

/// Canonical shape; older files named the update field `modified`.
///
/// A record carrying both `updated` and `modified` is rejected as
/// [`IndexError::Unreadable`] rather than guessing which one wins.
#[derive(Debug, Deserialize)]
struct StampedCompat {
    slug: Slug,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    tags: Vec<String>,
    created: Timestamp,
    #[serde(default, alias = "modified")]
    updated: Option<Timestamp>,
}

/// Early shape carrying a single `date` string instead of a timestamp pair.
#[derive(Debug, Deserialize)]
struct DatedCompat {
    slug: Slug,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    tags: Vec<String>,
    date: String,
}

impl RecordCompat {
    fn normalize(self, path: &Path) -> Result<PublishedRecord, IndexError> {
        match self {
            RecordCompat::Stamped(r) => Ok(PublishedRecord {
                updated: r.updated.unwrap_or(r.created),
                slug: r.slug,
                title: r.title,
                summary: r.summary,
                tags: r.tags,
                created: r.created,
            }),
            RecordCompat::Dated(r) => {
                let Some(ts) = parse_legacy_date(&r.date) else {
                    return Err(IndexError::Corrupt {
                        path: path.to_path_buf(),
                        reason: format!("record '{}' has unparsable date '{}'", r.slug, r.date),
                    });
                };
                Ok(PublishedRecord {
                    slug: r.slug,
                    title: r.title,
                    summary: r.summary,
                    tags: r.tags,
                    created: ts,
                    updated: ts,
                })
            }
        }
    }
}

/// RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
fn parse_legacy_date(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load the index at `path`.
///
/// Returns an empty index with `needs_init` set if the file is absent,
/// `IndexError::Unreadable` if it is not a JSON array of records, and
/// `IndexError::Corrupt` on duplicate or empty slugs.
pub fn load_at(path: &Path) -> Result<LoadedIndex, IndexError> {
    let stored = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("index {} does not exist yet", path.display());
            return Ok(LoadedIndex {
                records: Vec::new(),
                needs_init: true,
                stored: String::new(),
            });
        }
        Err(e) => return Err(io_err(path, e)),
    };

    let records = parse(path, &stored)?;
    tracing::debug!("loaded {} record(s) from {}", records.len(), path.display());
    Ok(LoadedIndex {
        records,
        needs_init: false,
        stored,
    })
}

/// Parse index text, migrating legacy record shapes to the canonical one.
pub fn parse(path: &Path, contents: &str) -> Result<Vec<PublishedRecord>, IndexError> {
    let raw: Vec<RecordCompat> =
        serde_json::from_str(contents).map_err(|source| IndexError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(raw.len());
    for entry in raw {
        let record = entry.normalize(path)?;
        if record.slug.is_empty() {
            return Err(IndexError::Corrupt {
                path: path.to_path_buf(),
                reason: "record with empty slug".to_string(),
            });
        }
        if !seen.insert(record.slug.clone()) {
            return Err(IndexError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("duplicate slug '{}'", record.slug),
            });
        }
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Render / replace (atomic)
// ---------------------------------------------------------------------------

/// The exact text [`replace_at`] writes: a JSON array indented by four spaces.
pub fn render(records: &[PublishedRecord]) -> Result<String, IndexError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Replace the whole index at `path` with `records`.
///
/// Write flow: serialize → `<file>.tmp` sibling → `rename`. The `.tmp` lives in
/// the same directory as the target so the rename never crosses filesystems.
/// On failure the `.tmp` is removed and the previous file is left as it was.
pub fn replace_at(path: &Path, records: &[PublishedRecord]) -> Result<(), IndexError> {
    let text = render(records)?;
    write_atomic(path, &text)?;
    tracing::info!("wrote {} record(s) to {}", records.len(), path.display());
    Ok(())
}

/// Materialize an empty index at `path` if no file exists there yet.
///
/// Returns `true` if the file was created. Idempotent.
pub fn init_at(path: &Path) -> Result<bool, IndexError> {
    if path.exists() {
        return Ok(false);
    }
    write_atomic(path, EMPTY_INDEX)?;
    tracing::info!("initialized empty index at {}", path.display());
    Ok(true)
}

/// `<file>.tmp` next to `path`.
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.tmp"))
}

fn write_atomic(path: &Path, text: &str) -> Result<(), IndexError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }

    let tmp = tmp_path_for(path);
    if let Err(e) = std::fs::write(&tmp, text) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(&tmp, e));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
