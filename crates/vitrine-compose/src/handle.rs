//! Deferred display requests from mounted widgets

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use vitrine_core::View;

/// A change a widget wants applied to its owning display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRequest {
    SetView(View),
    /// Force a template; an empty path clears the override
    ForceTemplate(PathBuf),
    Rescan,
}

/// Handle given to device-consumer widgets
///
/// Requests are queued and applied by
/// [`DisplayComposer::process_requests`](crate::DisplayComposer::process_requests)
/// on a later turn of the host event loop, never while the composer is
/// mounting.
#[derive(Debug, Clone, Default)]
pub struct DisplayHandle {
    queue: Rc<RefCell<VecDeque<DisplayRequest>>>,
}

impl DisplayHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self, request: DisplayRequest) {
        self.queue.borrow_mut().push_back(request);
    }

    pub fn set_view(&self, view: View) {
        self.request(DisplayRequest::SetView(view));
    }

    pub fn force_template(&self, path: impl Into<PathBuf>) {
        self.request(DisplayRequest::ForceTemplate(path.into()));
    }

    /// Number of requests waiting to be applied
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// True if both handles feed the same display
    pub fn same_display(&self, other: &DisplayHandle) -> bool {
        Rc::ptr_eq(&self.queue, &other.queue)
    }

    pub(crate) fn drain(&self) -> Vec<DisplayRequest> {
        self.queue.borrow_mut().drain(..).collect()
    }
}
