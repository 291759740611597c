//! Site configuration, read from `<root>/blogpress.yaml`.
//!
//! # API pattern
//!
//! As with the index store, functions take the site root explicitly
//! (`load_at(root)`); [`default_root`] derives `~/blog` from
//! `dirs::home_dir()` for the CLI. Tests always pass a `TempDir` root.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the optional site config inside the root.
pub const CONFIG_FILE: &str = "blogpress.yaml";

/// Layout of a blog checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding the content labels, relative to the root.
    pub content_dir: PathBuf,
    /// Label (sub-directory of `content_dir`) holding posts.
    pub posts_label: String,
    /// Index file, relative to the root.
    pub index_file: PathBuf,
    /// Suffix stripped from candidate file names, including the dot.
    pub extension: String,
    /// Default size of the "recent posts" listing.
    pub recent_count: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            posts_label: "posts".to_string(),
            index_file: PathBuf::from("published.json"),
            extension: ".md".to_string(),
            recent_count: 3,
        }
    }
}

impl SiteConfig {
    /// `<root>/<index_file>`
    pub fn index_path(&self, root: &Path) -> PathBuf {
        root.join(&self.index_file)
    }

    /// `<root>/<content_dir>/<posts_label>/`
    pub fn posts_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.content_dir).join(&self.posts_label)
    }

    /// `<root>/<content_dir>/<posts_label>/<slug><extension>`
    pub fn post_path(&self, root: &Path, slug: &str) -> PathBuf {
        self.posts_dir(root)
            .join(format!("{slug}{}", self.extension))
    }
}

/// Load `<root>/blogpress.yaml`, falling back to defaults if it is absent.
pub fn load_at(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SiteConfig::default()),
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    if contents.trim().is_empty() {
        return Ok(SiteConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// `~/blog`, the conventional site root.
pub fn default_root() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join("blog"))
        .ok_or(ConfigError::HomeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_file_missing() {
        let root = TempDir::new().unwrap();
        assert_eq!(load_at(root.path()).unwrap(), SiteConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join(CONFIG_FILE), "index_file: data/index.json\n").unwrap();
        let cfg = load_at(root.path()).unwrap();
        assert_eq!(cfg.index_file, PathBuf::from("data/index.json"));
        assert_eq!(cfg.posts_label, "posts");
        assert_eq!(cfg.index_path(root.path()), root.path().join("data/index.json"));
    }

    #[test]
    fn post_path_joins_label_and_extension() {
        let cfg = SiteConfig::default();
        let p = cfg.post_path(Path::new("/blog"), "hello");
        assert_eq!(p, PathBuf::from("/blog/content/posts/hello.md"));
    }

    #[test]
    fn malformed_yaml_is_parse_error_with_path() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join(CONFIG_FILE), "recent_count: [unclosed").unwrap();
        let err = load_at(root.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
