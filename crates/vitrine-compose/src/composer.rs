//! Device display composer
//!
//! Owns the bound device, the active view, the forced template override, and
//! the mounted widget subtree. Every change of input rebuilds the display
//! from scratch:
//!
//! 1. The forced override, if set
//! 2. Otherwise the registry's best candidate for the active view
//! 3. A blank placeholder when there is no template or it fails to load
//!
//! Load failures are logged and contained; [`DisplayComposer::resolve`] never
//! fails and always leaves exactly one subtree mounted.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use vitrine_core::{Device, Macros, TemplateList, TemplateLists, TemplateRegistry, View};

use crate::factory::{ConstructorArgs, DeviceFactory};
use crate::handle::{DisplayHandle, DisplayRequest};
use crate::loader::{LoadError, TemplateLoader};
use crate::menu::SelectionMenu;
use crate::mount::ComposedDisplay;
use crate::widget::{visit_mut, Widget};

/// Why the composer is showing a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Neither an override nor a registry candidate was available
    NoTemplate,
    /// The last template attempted failed to load
    LoadFailed { path: PathBuf, message: String },
}

/// Composer lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerState {
    /// Nothing resolved yet
    Empty,
    /// Resolution in progress; never observable from outside `resolve`
    Resolving,
    /// Mounted the subtree built from this template
    Composed(PathBuf),
    /// Mounted a placeholder
    Fallback(FallbackReason),
}

#[derive(Error, Debug)]
enum ResolutionError {
    #[error("No template available for {0}")]
    NoTemplate(View),
    #[error("Unable to load file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}

impl From<ResolutionError> for FallbackReason {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::NoTemplate(_) => FallbackReason::NoTemplate,
            ResolutionError::Load { path, source } => FallbackReason::LoadFailed {
                path,
                message: source.to_string(),
            },
        }
    }
}

/// Resolves and mounts the display for a single device
pub struct DisplayComposer {
    registry: TemplateRegistry,
    loader: Rc<dyn TemplateLoader>,
    device: Option<Rc<dyn Device>>,
    macros: Macros,
    view: View,
    forced_override: Option<PathBuf>,
    display: ComposedDisplay,
    state: ComposerState,
    handle: DisplayHandle,
}

impl DisplayComposer {
    /// Create a composer with no device bound and a placeholder mounted
    pub fn new(registry: TemplateRegistry, loader: Rc<dyn TemplateLoader>) -> Self {
        Self {
            registry,
            loader,
            device: None,
            macros: Macros::new(),
            view: View::default(),
            forced_override: None,
            display: ComposedDisplay::new(),
            state: ComposerState::Empty,
            handle: DisplayHandle::new(),
        }
    }

    /// Create a composer and bind `device`, optionally forcing a template
    pub fn from_device(
        registry: TemplateRegistry,
        loader: Rc<dyn TemplateLoader>,
        device: Rc<dyn Device>,
        template: Option<&Path>,
        macros: Option<Macros>,
    ) -> Self {
        let mut composer = Self::new(registry, loader);
        composer.forced_override = template
            .filter(|t| !t.as_os_str().is_empty())
            .map(Path::to_path_buf);
        composer.bind_device(device, macros);
        composer
    }

    /// Create a composer for a device instantiated by type name
    ///
    /// Construction failures are logged and yield `None`.
    pub fn from_type(
        registry: TemplateRegistry,
        loader: Rc<dyn TemplateLoader>,
        factory: &dyn DeviceFactory,
        type_name: &str,
        template: Option<&Path>,
        macros: Option<Macros>,
        args: &ConstructorArgs,
    ) -> Option<Self> {
        match factory.instantiate(type_name, args) {
            Ok(device) => Some(Self::from_device(registry, loader, device, template, macros)),
            Err(err) => {
                error!(device_type = %type_name, error = %err, "Failed to create display from device type");
                None
            }
        }
    }

    /// Bind a device, replacing any previously bound one
    ///
    /// Effective macros are `macros` if given and non-empty, else the device
    /// metadata, else an empty mapping; `name` and `prefix` are filled in
    /// from the device when missing.
    pub fn bind_device(&mut self, device: Rc<dyn Device>, macros: Option<Macros>) {
        if let Some(previous) = self.device.take() {
            let dropped = self.handle.drain().len();
            debug!(device = %previous.name(), dropped_requests = dropped, "Removing device");
            self.display.clear();
            self.macros.clear();
            self.handle = DisplayHandle::new();
        }

        self.macros = effective_macros(&*device, macros);
        info!(
            device = %device.name(),
            device_type = %device.device_type().name,
            "Binding device to display"
        );
        self.device = Some(device);
        self.rescan();
        self.resolve();
    }

    /// Host-facing name for [`bind_device`](Self::bind_device)
    pub fn add_device(&mut self, device: Rc<dyn Device>, macros: Option<Macros>) {
        self.bind_device(device, macros);
    }

    /// Switch the active view, re-resolving if it changed
    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.resolve();
        }
    }

    /// Force a template; an empty path clears the override
    pub fn set_forced_override(&mut self, path: impl Into<PathBuf>) {
        let path: PathBuf = path.into();
        let forced = if path.as_os_str().is_empty() { None } else { Some(path) };
        if forced != self.forced_override {
            self.forced_override = forced;
            self.resolve();
        }
    }

    /// Re-run the template search for the bound device
    ///
    /// Takes effect on the next [`resolve`](Self::resolve). Without a device
    /// this does nothing.
    pub fn rescan(&mut self) {
        if let Some(device) = &self.device {
            self.registry.recompute(Some(device.device_type()), &self.macros);
        }
    }

    /// Host-facing name for [`rescan`](Self::rescan)
    pub fn search_for_templates(&mut self) {
        self.rescan();
    }

    /// Rebuild the mounted display from the current inputs
    ///
    /// The chosen template is the forced override if set, else the registry's
    /// best candidate for the active view. A chosen template that fails to
    /// load mounts the placeholder; no other candidate is attempted.
    pub fn resolve(&mut self) {
        self.state = ComposerState::Resolving;

        let (chosen, forced) = match &self.forced_override {
            Some(path) => (Some(path.clone()), true),
            None => (self.registry.best(self.view).map(|c| c.path.clone()), false),
        };

        let Some(path) = chosen else {
            warn!(view = %self.view, "No templates available for display type");
            return self.fall_back(ResolutionError::NoTemplate(self.view).into());
        };

        match self.load(&path) {
            Ok(widget) => self.compose(path, widget),
            Err(err) => {
                if forced {
                    error!(error = %err, "Unable to load forced template");
                } else {
                    error!(error = %err, "Unable to load template");
                }
                self.fall_back(err.into());
            }
        }
    }

    /// Apply display requests queued by mounted widgets
    ///
    /// Returns the number of requests applied.
    pub fn process_requests(&mut self) -> usize {
        let requests = self.handle.drain();
        let applied = requests.len();
        for request in requests {
            debug!(request = ?request, "Applying display request");
            match request {
                DisplayRequest::SetView(view) => self.set_view(view),
                DisplayRequest::ForceTemplate(path) => self.set_forced_override(path),
                DisplayRequest::Rescan => {
                    self.rescan();
                    self.resolve();
                }
            }
        }
        applied
    }

    /// Menu of every candidate template, grouped by view
    pub fn build_selection_menu(&self) -> SelectionMenu {
        SelectionMenu::from_lists(self.registry.lists())
    }

    pub fn device(&self) -> Option<&Rc<dyn Device>> {
        self.device.as_ref()
    }

    /// Name of the bound device, empty if none
    pub fn device_name(&self) -> String {
        self.device
            .as_ref()
            .map(|d| d.name().to_string())
            .unwrap_or_default()
    }

    /// Qualified type name of the bound device, empty if none
    pub fn device_class(&self) -> String {
        self.device
            .as_ref()
            .map(|d| d.device_type().qualified_name())
            .unwrap_or_default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn forced_override(&self) -> Option<&Path> {
        self.forced_override.as_deref()
    }

    /// Template currently rendered, none when a placeholder is mounted
    pub fn current_template(&self) -> Option<&Path> {
        self.display.template()
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn macros(&self) -> &Macros {
        &self.macros
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn templates(&self, view: View) -> &TemplateList {
        self.registry.templates(view)
    }

    pub fn template_lists(&self) -> &TemplateLists {
        self.registry.lists()
    }

    pub fn display(&self) -> &ComposedDisplay {
        &self.display
    }

    /// Handle for queueing requests against this composer
    ///
    /// Rebinding a device discards pending requests and issues a new handle;
    /// requests sent through an older handle are never applied.
    pub fn handle(&self) -> DisplayHandle {
        self.handle.clone()
    }

    fn load(&self, path: &Path) -> Result<Box<dyn Widget>, ResolutionError> {
        debug!(path = %path.display(), "Loading template");
        let loader = &self.loader;
        let macros = &self.macros;
        let outcome = catch_unwind(AssertUnwindSafe(|| loader.load(path, macros)));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => Err(LoadError::Panicked {
                path: path.to_path_buf(),
                message: panic_message(payload.as_ref()),
            }),
        };
        result.map_err(|source| ResolutionError::Load {
            path: path.to_path_buf(),
            source,
        })
    }

    fn compose(&mut self, path: PathBuf, widget: Box<dyn Widget>) {
        self.display.replace(widget, Some(path.clone()));

        if let Some(device) = &self.device {
            let device = Rc::downgrade(device);
            let handle = self.handle.clone();
            visit_mut(self.display.root_mut(), &mut |widget: &mut dyn Widget| {
                if let Some(consumer) = widget.as_device_consumer() {
                    consumer.set_device(device.clone());
                    consumer.set_owning_display(handle.clone());
                }
            });
        }

        debug!(path = %path.display(), "Composed display");
        self.state = ComposerState::Composed(path);
    }

    fn fall_back(&mut self, reason: FallbackReason) {
        self.display.clear();
        self.state = ComposerState::Fallback(reason);
    }
}

fn effective_macros(device: &dyn Device, macros: Option<Macros>) -> Macros {
    let mut macros = macros
        .filter(|m| !m.is_empty())
        .or_else(|| device.metadata())
        .unwrap_or_default();
    macros
        .entry("name".to_string())
        .or_insert_with(|| device.name().to_string());
    if let Some(prefix) = device.prefix() {
        macros
            .entry("prefix".to_string())
            .or_insert_with(|| prefix.to_string());
    }
    macros
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
