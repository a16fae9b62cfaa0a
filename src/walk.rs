//! Advisory discovery.
//!
//! Walks an advisories root and yields every candidate record as a
//! [`RecordSource`]. Hidden entries and `vendor/` are skipped, symlinks are
//! not followed, and files placed directly in the root (README, composer.json,
//! tooling) are not records. Extension filtering is deliberately left to the
//! validator, which reports stray files instead of ignoring them.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::model::RecordSource;

const SKIPPED_DIRS: [&str; 1] = ["vendor"];

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Failed to walk advisories directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Collects advisory records below `root`, sorted by relative path.
pub fn discover(root: &Path) -> Result<Vec<RecordSource>, WalkError> {
    let mut records = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let bytes = fs::read(entry.path()).map_err(|source| WalkError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        records.push(RecordSource::new(
            relative_path(root, entry.path()),
            String::from_utf8_lossy(&bytes),
        ));
    }

    debug!(root = %root.display(), records = records.len(), "Discovery finished");
    Ok(records)
}

/// Hidden entries and dependency directories below the root.
fn is_skipped(entry: &DirEntry) -> bool {
    // The root itself may well be a dot-directory (e.g. a temp dir).
    if entry.depth() == 0 {
        return false;
    }
    is_skipped_name(entry.file_name().to_str())
}

fn is_skipped_name(name: Option<&str>) -> bool {
    name.map(|name| name.starts_with('.') || SKIPPED_DIRS.contains(&name))
        .unwrap_or(true)
}

/// `/`-separated path of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_hidden_and_vendor() {
        assert!(is_skipped_name(Some(".git")));
        assert!(is_skipped_name(Some("vendor")));
        assert!(is_skipped_name(None));
        assert!(!is_skipped_name(Some("acme")));
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/data/advisories");
        let path = root.join("acme").join("widget").join("a.yaml");
        assert_eq!(relative_path(root, &path), "acme/widget/a.yaml");
    }
}
