//! Filesystem search for per-type templates
//!
//! Templates are matched by naming convention: a file called
//! `<Ancestor>_<view>.<ext>` in any of the search directories renders `view`
//! for devices whose ancestor chain contains `Ancestor`.

use std::path::{Path, PathBuf};
use tracing::trace;

use crate::view::View;

/// Default extension precedence
pub fn default_extensions() -> Vec<String> {
    vec!["ui".to_string(), "toml".to_string()]
}

/// Scans a priority-ordered directory list for convention-named templates
///
/// Nothing is cached: every call reflects the filesystem as it is now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySearch {
    directories: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl DirectorySearch {
    pub fn new(directories: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self {
            directories,
            extensions,
        }
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Filename stem for an ancestor/view pair (e.g. `Motor_detailed`)
    pub fn stem(ancestor: &str, view: View) -> String {
        format!("{}_{}", ancestor, view.label())
    }

    /// All existing templates for `view`, ordered by directory, then
    /// ancestor (most-derived first), then extension precedence
    pub fn find(&self, ancestors: &[String], view: View) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for directory in &self.directories {
            let directory = absolutize(directory);
            for ancestor in ancestors {
                let stem = Self::stem(ancestor, view);
                for ext in &self.extensions {
                    let candidate = directory.join(format!("{}.{}", stem, ext));
                    trace!(path = %candidate.display(), "Checking for template");
                    if candidate.is_file() {
                        found.push(candidate);
                    }
                }
            }
        }
        found
    }
}

/// Make a path absolute against the working directory without touching symlinks
pub fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
