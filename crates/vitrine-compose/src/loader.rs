//! Template loading: turning a template file plus macros into a widget subtree
//!
//! The engine only depends on the [`TemplateLoader`] trait. [`PanelLoader`]
//! is the stock implementation: templates are TOML documents describing a
//! panel tree. `${key}` macro placeholders are expanded inside string values
//! after parsing, so macro values never need TOML escaping.
//!
//! ```toml
//! title = "${name}"
//!
//! [[widget]]
//! kind = "device_name"
//!
//! [[widget]]
//! kind = "panel"
//! title = "Readback"
//!
//!   [[widget.widget]]
//!   kind = "label"
//!   text = "Read signals of ${name}"
//!
//! [[widget]]
//! kind = "include"
//! path = "common/footer.ui"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use vitrine_core::Macros;

use crate::widget::{DeviceName, Label, Panel, Widget};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionError {
    #[error("Undefined macro '{0}'")]
    Undefined(String),
    #[error("Unterminated macro placeholder")]
    Unterminated,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse template {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Template {path} references missing resource {resource}")]
    MissingResource { path: PathBuf, resource: PathBuf },
    #[error("Macro substitution failed in {path}: {source}")]
    Substitution {
        path: PathBuf,
        #[source]
        source: SubstitutionError,
    },
    #[error("Includes nested too deeply at {path}")]
    IncludeDepth { path: PathBuf },
    #[error("Template loader panicked on {path}: {message}")]
    Panicked { path: PathBuf, message: String },
}

/// Builds a widget subtree from a template file
pub trait TemplateLoader {
    fn load(&self, path: &Path, macros: &Macros) -> Result<Box<dyn Widget>, LoadError>;
}

impl<F> TemplateLoader for F
where
    F: Fn(&Path, &Macros) -> Result<Box<dyn Widget>, LoadError>,
{
    fn load(&self, path: &Path, macros: &Macros) -> Result<Box<dyn Widget>, LoadError> {
        self(path, macros)
    }
}

/// Replace every `${key}` in `text` with its macro value
pub fn substitute(text: &str, macros: &Macros) -> Result<String, SubstitutionError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or(SubstitutionError::Unterminated)?;
        let key = after[..end].trim();
        let value = macros
            .get(key)
            .ok_or_else(|| SubstitutionError::Undefined(key.to_string()))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct TemplateDocument {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "widget")]
    widgets: Vec<WidgetSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WidgetSpec {
    Panel {
        #[serde(default)]
        title: Option<String>,
        #[serde(default, rename = "widget")]
        widgets: Vec<WidgetSpec>,
    },
    Label {
        text: String,
    },
    DeviceName,
    Include {
        path: String,
    },
}

/// Loads TOML panel templates
///
/// The file extension is not interpreted; `.ui` and `.toml` files are read
/// the same way. `include` paths are relative to the including template.
#[derive(Debug, Clone)]
pub struct PanelLoader {
    max_include_depth: usize,
}

impl Default for PanelLoader {
    fn default() -> Self {
        Self {
            max_include_depth: 8,
        }
    }
}

impl PanelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    fn load_document(&self, path: &Path, macros: &Macros, depth: usize) -> Result<Panel, LoadError> {
        debug!(path = %path.display(), depth, "Loading template");
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: TemplateDocument = toml::from_str(&text).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let title = document
            .title
            .map(|title| expand(&title, path, macros))
            .transpose()?;
        let mut root = Panel::new(title);
        for spec in document.widgets {
            root.push(self.build(spec, path, macros, depth)?);
        }
        Ok(root)
    }

    fn build(
        &self,
        spec: WidgetSpec,
        template: &Path,
        macros: &Macros,
        depth: usize,
    ) -> Result<Box<dyn Widget>, LoadError> {
        let widget: Box<dyn Widget> = match spec {
            WidgetSpec::Panel { title, widgets } => {
                let title = title.map(|title| expand(&title, template, macros)).transpose()?;
                let mut panel = Panel::new(title);
                for child in widgets {
                    panel.push(self.build(child, template, macros, depth)?);
                }
                Box::new(panel)
            }
            WidgetSpec::Label { text } => Box::new(Label::new(expand(&text, template, macros)?)),
            WidgetSpec::DeviceName => Box::new(DeviceName::new()),
            WidgetSpec::Include { path } => {
                let path = PathBuf::from(expand(&path, template, macros)?);
                let resource = match template.parent() {
                    Some(dir) if path.is_relative() => dir.join(&path),
                    _ => path,
                };
                if !resource.is_file() {
                    return Err(LoadError::MissingResource {
                        path: template.to_path_buf(),
                        resource,
                    });
                }
                if depth >= self.max_include_depth {
                    return Err(LoadError::IncludeDepth { path: resource });
                }
                Box::new(self.load_document(&resource, macros, depth + 1)?)
            }
        };
        Ok(widget)
    }
}

fn expand(text: &str, template: &Path, macros: &Macros) -> Result<String, LoadError> {
    substitute(text, macros).map_err(|source| LoadError::Substitution {
        path: template.to_path_buf(),
        source,
    })
}

impl TemplateLoader for PanelLoader {
    fn load(&self, path: &Path, macros: &Macros) -> Result<Box<dyn Widget>, LoadError> {
        let root = self.load_document(path, macros, 0)?;
        Ok(Box::new(root))
    }
}
