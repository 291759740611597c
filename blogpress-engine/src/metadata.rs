//! Fresh front-matter for a slug.
//!
//! Content files start with a YAML block:
//!
//! ```text
//! ---
//! title: Hello
//! summary: First post
//! tags: [meta, rust]
//! publish: true
//! ---
//! Body text…
//! ```
//!
//! or a TOML block fenced by `+++`:
//!
//! ```text
//! +++
//! title = "Hello"
//! publish = true
//! +++
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use blogpress_core::{SiteConfig, Slug, SourceMetadata};

use crate::error::{io_err, MetadataError};

/// Source of fresh [`SourceMetadata`] for a candidate.
///
/// The reconciler calls [`read`](MetadataReader::read) at most once per
/// candidate per run and treats every error as fatal.
pub trait MetadataReader {
    fn read(&self, slug: &Slug) -> Result<SourceMetadata, MetadataError>;
}

/// Reads a slug's content file from the site's posts directory.
#[derive(Debug, Clone)]
pub struct FrontmatterReader {
    root: PathBuf,
    config: SiteConfig,
}

impl FrontmatterReader {
    /// Reader over the posts directory of the site rooted at `root`.
    pub fn for_site(root: &Path, config: &SiteConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config: config.clone(),
        }
    }

    pub fn path_for(&self, slug: &Slug) -> PathBuf {
        self.config.post_path(&self.root, slug.as_str())
    }
}

impl MetadataReader for FrontmatterReader {
    fn read(&self, slug: &Slug) -> Result<SourceMetadata, MetadataError> {
        let path = self.path_for(slug);
        tracing::debug!("reading front matter from {}", path.display());
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MetadataError::NotFound {
                    slug: slug.clone(),
                    path,
                })
            }
            Err(e) => return Err(io_err(path, e)),
        };
        parse_front_matter(&path, &contents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    Yaml,
    Toml,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        match line {
            "---" => Some(Fence::Yaml),
            "+++" => Some(Fence::Toml),
            _ => None,
        }
    }

    fn closes(self, line: &str) -> bool {
        match self {
            Fence::Yaml => line == "---" || line == "...",
            Fence::Toml => line == "+++",
        }
    }
}

/// Parse the front-matter block at the top of `contents`.
///
/// No block at all yields default metadata (`publish = false`): a file
/// without front matter is a draft.
pub fn parse_front_matter(path: &Path, contents: &str) -> Result<SourceMetadata, MetadataError> {
    let Some((fence, block)) = extract_block(contents) else {
        return Ok(SourceMetadata::default());
    };
    let Some(body) = block else {
        return Err(MetadataError::Unterminated {
            path: path.to_path_buf(),
        });
    };
    if body.trim().is_empty() {
        return Ok(SourceMetadata::default());
    }
    match fence {
        Fence::Yaml => serde_yaml::from_str(&body).map_err(|source| MetadataError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Fence::Toml => toml::from_str(&body).map_err(|source| MetadataError::ParseToml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// `None`: no opening fence. `Some((_, None))`: opened but never closed.
/// `Some((_, Some(text)))`: the text between the fences.
fn extract_block(contents: &str) -> Option<(Fence, Option<String>)> {
    let mut lines = contents.lines();

    // First line must be a fence (with optional BOM)
    let first = lines.next()?.trim_start_matches('\u{feff}').trim_end();
    let fence = Fence::open(first)?;

    let mut body: Vec<&str> = Vec::new();
    for line in lines {
        if fence.closes(line.trim_end()) {
            return Some((fence, Some(body.join("\n"))));
        }
        body.push(line);
    }
    Some((fence, None))
}
