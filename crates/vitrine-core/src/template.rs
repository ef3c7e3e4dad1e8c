//! Template candidates and the ordered, deduplicated per-view candidate list

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a template candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSource {
    /// Per-view path supplied through the device macros
    Macro,
    /// Found by filename convention for one of the device's ancestor types
    Hierarchy,
    /// Built-in fallback shipped with the engine
    Default,
}

/// A template file that can render a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCandidate {
    /// Absolute path to the template file
    pub path: PathBuf,
    pub source: TemplateSource,
}

impl TemplateCandidate {
    pub fn new(path: impl Into<PathBuf>, source: TemplateSource) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    /// File name of the template, for display in menus
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Ordered candidates for a single view
///
/// A file appears at most once; the first insertion wins. Paths naming the
/// same existing file (through `..` or a symlink) count as one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateList {
    candidates: Vec<TemplateCandidate>,
}

impl TemplateList {
    pub const fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Append a candidate unless its path is already listed
    ///
    /// Returns true if the candidate was added.
    pub fn push(&mut self, candidate: TemplateCandidate) -> bool {
        if self.contains(&candidate.path) {
            return false;
        }
        self.candidates.push(candidate);
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        let canonical = std::fs::canonicalize(path).ok();
        self.candidates.iter().any(|c| {
            c.path == path
                || canonical
                    .as_ref()
                    .is_some_and(|canonical| std::fs::canonicalize(&c.path).ok().as_ref() == Some(canonical))
        })
    }

    /// Highest-priority candidate
    pub fn first(&self) -> Option<&TemplateCandidate> {
        self.candidates.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TemplateCandidate> {
        self.candidates.iter()
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.candidates.iter().map(|c| c.path.as_path()).collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }
}

impl<'a> IntoIterator for &'a TemplateList {
    type Item = &'a TemplateCandidate;
    type IntoIter = std::slice::Iter<'a, TemplateCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
