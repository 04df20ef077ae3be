// Collaborator seams - target resolution is owned by the host's rendering layer

use std::rc::Rc;

use crate::catalog::StepDescriptor;

/// Opaque reference to a resolved target, handed back to the resolver for scrolling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub target: String,
    pub node_id: u64,
}

impl ElementHandle {
    pub fn new(target: impl Into<String>, node_id: u64) -> Self {
        Self {
            target: target.into(),
            node_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetResolution {
    Found(ElementHandle),
    NotFound,
}

/// Locates step targets and brings them into view.
pub trait TargetResolver {
    /// Find the element a step points at.
    fn resolve(&self, step: &StepDescriptor) -> TargetResolution;

    /// Start scrolling the element into view. Fire-and-forget; the settle
    /// delay covers the time this takes.
    fn scroll_into_view(&self, handle: &ElementHandle);
}

impl<T: TargetResolver + ?Sized> TargetResolver for Box<T> {
    fn resolve(&self, step: &StepDescriptor) -> TargetResolution {
        (**self).resolve(step)
    }

    fn scroll_into_view(&self, handle: &ElementHandle) {
        (**self).scroll_into_view(handle)
    }
}

impl<T: TargetResolver + ?Sized> TargetResolver for Rc<T> {
    fn resolve(&self, step: &StepDescriptor) -> TargetResolution {
        (**self).resolve(step)
    }

    fn scroll_into_view(&self, handle: &ElementHandle) {
        (**self).scroll_into_view(handle)
    }
}
