/*!
 * Retention
 *
 * Append-only keep-alive lists. Every primitive that stores an address or an
 * object handle into a view also records the target here, so the target lives
 * at least as long as the view. The lists form a manually maintained
 * ownership graph; a view that ends up retaining itself is never freed.
 */

use crate::memory::ObjectHandle;
use crate::view::MemoryView;
use std::fmt;
use std::sync::Arc;

/// Something a view keeps alive
#[derive(Clone)]
pub enum Retained {
    View(MemoryView),
    Object(ObjectHandle),
}

impl Retained {
    pub fn as_view(&self) -> Option<&MemoryView> {
        match self {
            Retained::View(view) => Some(view),
            Retained::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Retained::Object(object) => Some(object),
            Retained::View(_) => None,
        }
    }
}

impl fmt::Debug for Retained {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Retained::View(view) => write!(f, "View({})", view),
            Retained::Object(object) => write!(f, "Object({:p})", Arc::as_ptr(object)),
        }
    }
}

impl From<MemoryView> for Retained {
    fn from(view: MemoryView) -> Self {
        Retained::View(view)
    }
}

impl From<&MemoryView> for Retained {
    fn from(view: &MemoryView) -> Self {
        Retained::View(view.clone())
    }
}

impl From<ObjectHandle> for Retained {
    fn from(object: ObjectHandle) -> Self {
        Retained::Object(object)
    }
}

impl MemoryView {
    /// Keep `target` alive for as long as this view is reachable
    pub fn attach(&self, target: impl Into<Retained>) {
        self.inner.retained.lock().push(target.into());
    }

    /// Number of references this view keeps alive
    pub fn retained_count(&self) -> usize {
        self.inner.retained.lock().len()
    }

    /// Snapshot of the retained references, oldest first
    pub fn retained(&self) -> Vec<Retained> {
        self.inner.retained.lock().clone()
    }

    /// Whether `target` is among the views this one keeps alive
    pub fn retains(&self, target: &MemoryView) -> bool {
        self.inner
            .retained
            .lock()
            .iter()
            .filter_map(Retained::as_view)
            .any(|view| view.same_view(target))
    }
}
