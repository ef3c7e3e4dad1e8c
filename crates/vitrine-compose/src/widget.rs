//! Widget tree abstraction and the stock widgets produced by templates

use std::rc::Weak;
use vitrine_core::Device;

use crate::handle::DisplayHandle;

/// A node in a rendered widget subtree
///
/// The rendering toolkit lives outside this crate; the engine only needs to
/// walk the tree, run lifecycle hooks, and find device consumers.
pub trait Widget {
    /// Short type tag (e.g. "panel")
    fn kind(&self) -> &'static str;

    /// One-line description used by text rendering
    fn describe(&self) -> String {
        self.kind().to_string()
    }

    fn children(&self) -> &[Box<dyn Widget>] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Widget>] {
        &mut []
    }

    /// Optional device-consumer capability
    fn as_device_consumer(&mut self) -> Option<&mut dyn DeviceConsumer> {
        None
    }

    /// Called after the widget becomes part of the mounted display
    fn mounted(&mut self) {}

    /// Called before the widget is removed from the mounted display
    fn unmounted(&mut self) {}
}

/// Capability for widgets that display data from the bound device
///
/// Widgets get a non-owning reference; the composer owns the device.
/// Reactions that would change the display (view switch, template switch)
/// must go through the [`DisplayHandle`], never back into the composer
/// directly.
pub trait DeviceConsumer {
    fn set_device(&mut self, device: Weak<dyn Device>);

    fn set_owning_display(&mut self, _display: DisplayHandle) {}
}

/// Visit every widget in a subtree, parent before children
pub fn visit_mut(root: &mut dyn Widget, f: &mut dyn FnMut(&mut dyn Widget)) {
    f(root);
    for child in root.children_mut() {
        visit_mut(child.as_mut(), f);
    }
}

/// Number of widgets in a subtree, including the root
pub fn count(root: &dyn Widget) -> usize {
    1 + root.children().iter().map(|c| count(c.as_ref())).sum::<usize>()
}

/// Indented text outline of a subtree
pub fn render_tree(root: &dyn Widget) -> String {
    let mut out = String::new();
    render_into(root, 0, &mut out);
    out
}

fn render_into(widget: &dyn Widget, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&widget.describe());
    out.push('\n');
    for child in widget.children() {
        render_into(child.as_ref(), depth + 1, out);
    }
}

/// Blank widget mounted whenever no template could be composed
#[derive(Debug, Default)]
pub struct Placeholder;

impl Widget for Placeholder {
    fn kind(&self) -> &'static str {
        "placeholder"
    }
}

/// Container with an optional title
#[derive(Default)]
pub struct Panel {
    pub title: Option<String>,
    pub children: Vec<Box<dyn Widget>>,
}

impl Panel {
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: Box<dyn Widget>) {
        self.children.push(child);
    }
}

impl Widget for Panel {
    fn kind(&self) -> &'static str {
        "panel"
    }

    fn describe(&self) -> String {
        match &self.title {
            Some(title) => format!("panel: {}", title),
            None => "panel".to_string(),
        }
    }

    fn children(&self) -> &[Box<dyn Widget>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Widget>] {
        &mut self.children
    }
}

/// Static text
#[derive(Debug, Clone)]
pub struct Label {
    pub text: String,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Widget for Label {
    fn kind(&self) -> &'static str {
        "label"
    }

    fn describe(&self) -> String {
        format!("label: {}", self.text)
    }
}

/// Shows the name of the bound device
#[derive(Default)]
pub struct DeviceName {
    device: Option<Weak<dyn Device>>,
    display: Option<DisplayHandle>,
}

impl DeviceName {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the device, if one was provided and is still alive
    pub fn device_name(&self) -> Option<String> {
        self.device
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|device| device.name().to_string())
    }

    pub fn display(&self) -> Option<&DisplayHandle> {
        self.display.as_ref()
    }
}

impl Widget for DeviceName {
    fn kind(&self) -> &'static str {
        "device_name"
    }

    fn describe(&self) -> String {
        match self.device_name() {
            Some(name) => format!("device_name: {}", name),
            None => "device_name: <unbound>".to_string(),
        }
    }

    fn as_device_consumer(&mut self) -> Option<&mut dyn DeviceConsumer> {
        Some(self)
    }
}

impl DeviceConsumer for DeviceName {
    fn set_device(&mut self, device: Weak<dyn Device>) {
        self.device = Some(device);
    }

    fn set_owning_display(&mut self, display: DisplayHandle) {
        self.display = Some(display);
    }
}
