//! The single mounted widget subtree and its lifecycle

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::widget::{Placeholder, Widget};

/// The mounted display: one widget subtree plus the template that produced it
///
/// Always holds exactly one subtree. Replacing it unmounts the old subtree
/// completely before the new one is mounted.
pub struct ComposedDisplay {
    root: Box<dyn Widget>,
    template: Option<PathBuf>,
    generation: u64,
}

impl Default for ComposedDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposedDisplay {
    /// Start with a mounted placeholder
    pub fn new() -> Self {
        let mut display = Self {
            root: Box::new(Placeholder),
            template: None,
            generation: 0,
        };
        mount_tree(display.root.as_mut());
        display
    }

    /// Tear down the current subtree and mount `root` in its place
    pub fn replace(&mut self, root: Box<dyn Widget>, template: Option<PathBuf>) {
        debug!(generation = self.generation, "Clearing existing display");
        unmount_tree(self.root.as_mut());
        self.root = root;
        self.template = template;
        self.generation += 1;
        mount_tree(self.root.as_mut());
    }

    /// Tear down the current subtree and mount a blank placeholder
    pub fn clear(&mut self) {
        self.replace(Box::new(Placeholder), None);
    }

    pub fn root(&self) -> &dyn Widget {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> &mut dyn Widget {
        self.root.as_mut()
    }

    /// Template that produced the mounted subtree, none for a placeholder
    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.template.is_none()
    }

    /// Number of times the subtree has been replaced
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn mount_tree(widget: &mut dyn Widget) {
    widget.mounted();
    for child in widget.children_mut() {
        mount_tree(child.as_mut());
    }
}

fn unmount_tree(widget: &mut dyn Widget) {
    for child in widget.children_mut() {
        unmount_tree(child.as_mut());
    }
    widget.unmounted();
}
