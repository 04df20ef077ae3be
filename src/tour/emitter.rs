// Event Emitter - one CallbackEvent per committed transition, delivered in place

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use uuid::Uuid;

use crate::catalog::StepDescriptor;
use crate::tour::types::{Action, CallbackEvent, EventType, Lifecycle, Status, TourSnapshot};

pub type TourCallback = Box<dyn FnMut(&CallbackEvent)>;

/// Committed state a record is built from.
#[derive(Debug, Clone, Copy)]
pub struct TransitionFacts<'a> {
    pub run_id: Uuid,
    pub index: usize,
    pub lifecycle: Lifecycle,
    pub status: Status,
    pub size: usize,
    pub step: &'a StepDescriptor,
    pub controlled: bool,
}

impl TransitionFacts<'_> {
    pub fn record(&self, event_type: EventType, action: Action) -> CallbackEvent {
        CallbackEvent {
            event_type,
            action,
            index: self.index,
            lifecycle: self.lifecycle,
            status: self.status,
            size: self.size,
            step: self.step.clone(),
            run_id: self.run_id,
            controlled: self.controlled,
        }
    }
}

/// A command the host asked for from inside its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRequest {
    pub action: Action,
    pub index: Option<usize>,
}

impl HostRequest {
    /// STOP and SKIP cut a running sequence short.
    pub fn interrupts(&self) -> bool {
        matches!(self.action, Action::Stop | Action::Skip)
    }
}

/// Queued host requests plus the state published for the event in flight.
/// Reachable from the callback while the controller itself is borrowed.
#[derive(Debug, Default)]
pub struct HostMailbox {
    requests: RefCell<VecDeque<HostRequest>>,
    view: RefCell<Option<TourSnapshot>>,
}

impl HostMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, request: HostRequest) {
        self.requests.borrow_mut().push_back(request);
    }

    pub fn push_front(&self, request: HostRequest) {
        self.requests.borrow_mut().push_front(request);
    }

    pub fn pop(&self) -> Option<HostRequest> {
        self.requests.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.borrow().is_empty()
    }

    /// Whether a STOP or SKIP was queued at position `start` or later.
    pub fn interrupt_queued_since(&self, start: usize) -> bool {
        self.requests
            .borrow()
            .iter()
            .skip(start)
            .any(HostRequest::interrupts)
    }

    pub fn publish(&self, snapshot: TourSnapshot) {
        *self.view.borrow_mut() = Some(snapshot);
    }

    /// State as of the most recent emission.
    pub fn view(&self) -> Option<TourSnapshot> {
        self.view.borrow().clone()
    }
}

/// Synchronous delivery to the host callback. Never buffers, drops or reorders:
/// `emit` returns only after the callback has returned.
pub struct EventEmitter {
    callback: TourCallback,
    emitted: u64,
    mailbox: Option<Rc<HostMailbox>>,
    interrupted: bool,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("emitted", &self.emitted)
            .field("interrupted", &self.interrupted)
            .finish_non_exhaustive()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::silent()
    }
}

impl EventEmitter {
    pub fn new(callback: impl FnMut(&CallbackEvent) + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            emitted: 0,
            mailbox: None,
            interrupted: false,
        }
    }

    pub fn attach_mailbox(&mut self, mailbox: Rc<HostMailbox>) {
        self.mailbox = Some(mailbox);
    }

    /// Make `snapshot` readable from the callback of the next emission.
    pub fn publish(&self, snapshot: TourSnapshot) {
        if let Some(mailbox) = &self.mailbox {
            mailbox.publish(snapshot);
        }
    }

    /// True when the callback of the last emission queued a STOP or SKIP.
    pub fn interrupt_requested(&self) -> bool {
        self.interrupted
    }

    /// An emitter whose events go nowhere (until a callback is attached).
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    pub fn set_callback(&mut self, callback: impl FnMut(&CallbackEvent) + 'static) {
        self.callback = Box::new(callback);
    }

    pub fn emit(&mut self, event: CallbackEvent) {
        self.emitted += 1;
        tracing::debug!(
            seq = self.emitted,
            run_id = %event.run_id,
            event_type = %event.event_type,
            action = %event.action,
            index = event.index,
            lifecycle = %event.lifecycle,
            status = %event.status,
            "Tour event"
        );
        let queued = self.mailbox.as_ref().map_or(0, |mailbox| mailbox.len());
        (self.callback)(&event);
        self.interrupted = self
            .mailbox
            .as_ref()
            .is_some_and(|mailbox| mailbox.interrupt_queued_since(queued));
    }

    /// Number of events delivered so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}
