// Mock collaborators for testing - record every call, no rendering

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::catalog::{StepCatalog, StepDescriptor};
use crate::tour::traits::{ElementHandle, TargetResolution, TargetResolver};
use crate::tour::types::CallbackEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverCall {
    Resolve { target: String },
    Scroll { target: String },
}

/// Resolver whose missing targets can be changed mid-test.
#[derive(Debug, Default)]
pub struct MockTargetResolver {
    pub missing: RefCell<HashSet<String>>,
    pub calls: RefCell<Vec<ResolverCall>>,
}

impl MockTargetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_missing(&self, target: &str, missing: bool) {
        let mut set = self.missing.borrow_mut();
        if missing {
            set.insert(target.to_string());
        } else {
            set.remove(target);
        }
    }

    pub fn get_calls(&self) -> Vec<ResolverCall> {
        self.calls.borrow().clone()
    }
}

impl TargetResolver for MockTargetResolver {
    fn resolve(&self, step: &StepDescriptor) -> TargetResolution {
        self.calls.borrow_mut().push(ResolverCall::Resolve {
            target: step.target.clone(),
        });
        if self.missing.borrow().contains(&step.target) {
            TargetResolution::NotFound
        } else {
            TargetResolution::Found(ElementHandle::new(step.target.clone(), 1))
        }
    }

    fn scroll_into_view(&self, handle: &ElementHandle) {
        self.calls.borrow_mut().push(ResolverCall::Scroll {
            target: handle.target.clone(),
        });
    }
}

/// Catalog of `size` steps targeting `#step-0`, `#step-1`, ...
pub fn numbered_catalog(size: usize) -> StepCatalog {
    let steps = (0..size)
        .map(|i| StepDescriptor::new(format!("#step-{i}"), format!("Step {}", i + 1)))
        .collect();
    StepCatalog::new(steps).expect("catalog fixture must not be empty")
}

/// Shared event log usable as a callback.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<CallbackEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl FnMut(&CallbackEvent) + 'static {
        let events = Rc::clone(&self.events);
        move |event: &CallbackEvent| events.borrow_mut().push(event.clone())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn all(&self) -> Vec<CallbackEvent> {
        self.events.borrow().clone()
    }

    /// Events recorded since the previous call to `drain`.
    pub fn drain(&self) -> Vec<CallbackEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}
