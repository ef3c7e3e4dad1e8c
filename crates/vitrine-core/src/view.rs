//! Display views: the three rendering granularities a device can be shown at

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SCREEN_SUFFIX: &str = "_screen";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown view: {0}")]
pub struct UnknownView(pub String);

/// Rendering granularity for a device display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Compact view meant to sit inside a larger screen
    Embedded,
    /// Standard operator view
    Detailed,
    /// Everything the device exposes
    Engineering,
}

impl Default for View {
    fn default() -> Self {
        Self::Detailed
    }
}

impl View {
    /// All views, in declaration order
    pub const ALL: [View; 3] = [View::Embedded, View::Detailed, View::Engineering];

    /// Full view name (e.g. `detailed_screen`), used as the macro key
    pub fn name(self) -> &'static str {
        match self {
            View::Embedded => "embedded_screen",
            View::Detailed => "detailed_screen",
            View::Engineering => "engineering_screen",
        }
    }

    /// View name with the `_screen` suffix stripped (e.g. `detailed`)
    ///
    /// This is the token used in template filenames.
    pub fn label(self) -> &'static str {
        let name = self.name();
        name.strip_suffix(SCREEN_SUFFIX).unwrap_or(name)
    }

    /// Human-readable title for menus (e.g. `Detailed`)
    pub fn title(self) -> String {
        let mut chars = self.label().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for View {
    type Err = UnknownView;

    /// Accepts either the full name or the label, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        View::ALL
            .into_iter()
            .find(|view| view.name() == lowered || view.label() == lowered)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}
