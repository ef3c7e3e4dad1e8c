//! Vitrine Core - Template resolution for device displays
//!
//! This crate decides which template renders each view of a device:
//! - Views and template candidate lists
//! - Device type abstraction and ancestor chains
//! - Convention-based template search across a directory path
//! - Macro-supplied template overrides
//! - The template registry that merges all sources under a fixed priority
//! - Built-in per-view default templates

pub mod ancestors;
pub mod builtin;
pub mod config;
pub mod device;
pub mod macros;
pub mod registry;
pub mod search;
pub mod template;
pub mod view;

pub use ancestors::AncestorResolver;
pub use builtin::{builtin_template, install_builtin_templates};
pub use config::{ConfigError, SearchConfig, BUILTIN_DIR_ENV, TEMPLATE_PATH_ENV};
pub use device::{Device, DeviceType, GenericDevice};
pub use macros::{MacroResolver, Macros};
pub use registry::{TemplateLists, TemplateRegistry};
pub use search::DirectorySearch;
pub use template::{TemplateCandidate, TemplateList, TemplateSource};
pub use view::{UnknownView, View};
