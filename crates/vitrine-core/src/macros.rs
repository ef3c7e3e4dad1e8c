//! Macro mappings and macro-supplied template overrides

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use crate::search::absolutize;
use crate::template::{TemplateCandidate, TemplateSource};
use crate::view::View;

/// String-keyed substitution values injected into templates at load time
pub type Macros = BTreeMap<String, String>;

/// Pulls per-view template overrides out of a macro mapping
///
/// A macro named after the view (`detailed_screen`, or the short `detailed`)
/// may point at a template file. Missing or invalid paths are not errors;
/// most devices carry no such macro.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroResolver;

impl MacroResolver {
    /// Raw macro value for `view`, full name taking precedence over the label
    pub fn lookup<'a>(macros: &'a Macros, view: View) -> Option<&'a str> {
        let value = |key: &str| {
            macros
                .get(key)
                .map(String::as_str)
                .filter(|value| !value.trim().is_empty())
        };
        value(view.name()).or_else(|| value(view.label()))
    }

    /// Macro-tagged candidate for `view`, if the macro names an existing file
    pub fn candidate(macros: &Macros, view: View) -> Option<TemplateCandidate> {
        let value = Self::lookup(macros, view)?;
        let path = absolutize(&PathBuf::from(value.trim()));
        if path.is_file() {
            Some(TemplateCandidate::new(path, TemplateSource::Macro))
        } else {
            debug!(view = %view, path = %path.display(), "Ignoring macro template that is not a file");
            None
        }
    }
}
