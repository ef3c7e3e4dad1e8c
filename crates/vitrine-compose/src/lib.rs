//! Vitrine Compose - Display composition for device templates
//!
//! This crate turns resolved templates into a mounted widget subtree:
//! - The display composer state machine (bind, switch view, force template)
//! - Template loading and macro substitution
//! - Widget tree abstraction with mount lifecycle and device-consumer capability
//! - Device construction by type name
//! - The template selection menu

pub mod composer;
pub mod factory;
pub mod handle;
pub mod loader;
pub mod menu;
pub mod mount;
pub mod widget;

pub use composer::{ComposerState, DisplayComposer, FallbackReason};
pub use factory::{ConstructionError, ConstructorArgs, DeviceCatalog, DeviceFactory};
pub use handle::{DisplayHandle, DisplayRequest};
pub use loader::{LoadError, PanelLoader, SubstitutionError, TemplateLoader};
pub use menu::{MenuAction, MenuGroup, SelectionMenu};
pub use mount::ComposedDisplay;
pub use widget::{render_tree, DeviceConsumer, DeviceName, Label, Panel, Placeholder, Widget};
