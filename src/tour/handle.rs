// Shared tour handle - the host-facing surface. Guards against re-entry from
// the callback and queues host requests made while an event is in flight

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tokio::time::Instant;
use tracing::{error, warn};

use crate::catalog::{StepCatalog, TourOptions};
use crate::tour::controller::TourController;
use crate::tour::emitter::{EventEmitter, HostMailbox, HostRequest};
use crate::tour::errors::TourError;
use crate::tour::traits::TargetResolver;
use crate::tour::types::{Action, CallbackEvent, TourSnapshot};

/// Rejected requests kept for `take_rejected`; older ones are dropped first.
pub const REJECTED_CAPACITY: usize = 64;

struct Shared<R: TargetResolver> {
    controller: RefCell<TourController<R>>,
    mailbox: Rc<HostMailbox>,
    rejected: RefCell<VecDeque<(HostRequest, TourError)>>,
}

/// Single-threaded handle to one tour. Clones share the same tour.
pub struct Tour<R: TargetResolver> {
    shared: Rc<Shared<R>>,
}

impl<R: TargetResolver> Clone for Tour<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<R: TargetResolver> std::fmt::Debug for Tour<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tour")
            .field("controller", &self.shared.controller)
            .field("queued", &self.shared.mailbox.len())
            .finish()
    }
}

/// Non-owning handle, for callbacks that need to reach their own tour.
pub struct WeakTour<R: TargetResolver> {
    shared: Weak<Shared<R>>,
}

impl<R: TargetResolver> Clone for WeakTour<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<R: TargetResolver> WeakTour<R> {
    pub fn upgrade(&self) -> Option<Tour<R>> {
        self.shared.upgrade().map(|shared| Tour { shared })
    }
}

impl<R: TargetResolver> Tour<R> {
    pub fn new(catalog: StepCatalog, options: TourOptions, resolver: R) -> Self {
        let mailbox = Rc::new(HostMailbox::new());
        let mut emitter = EventEmitter::silent();
        emitter.attach_mailbox(Rc::clone(&mailbox));
        let controller = TourController::new(catalog, options, resolver, emitter);
        Self {
            shared: Rc::new(Shared {
                controller: RefCell::new(controller),
                mailbox,
                rejected: RefCell::new(VecDeque::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakTour<R> {
        WeakTour {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Attach the host callback. Every event is delivered to it synchronously.
    pub fn on_event(&self, callback: impl FnMut(&CallbackEvent) + 'static) -> Result<(), TourError> {
        self.dispatch(|controller| {
            controller.set_callback(callback);
            Ok(())
        })
    }

    pub fn start(&self, index: usize) -> Result<(), TourError> {
        self.dispatch(|controller| controller.start(index))
    }

    pub fn advance(&self, action: Action, index: Option<usize>) -> Result<(), TourError> {
        self.dispatch(|controller| controller.advance(action, index))
    }

    pub fn next(&self) -> Result<(), TourError> {
        self.advance(Action::Next, None)
    }

    pub fn prev(&self) -> Result<(), TourError> {
        self.advance(Action::Prev, None)
    }

    pub fn go(&self, index: usize) -> Result<(), TourError> {
        self.advance(Action::Go, Some(index))
    }

    /// Host-supplied step index, as from a controlled prop update.
    pub fn update(&self, index: usize) -> Result<(), TourError> {
        self.advance(Action::Update, Some(index))
    }

    pub fn stop(&self) -> Result<(), TourError> {
        self.advance(Action::Stop, None)
    }

    pub fn close(&self) -> Result<(), TourError> {
        self.advance(Action::Close, None)
    }

    pub fn skip(&self) -> Result<(), TourError> {
        self.advance(Action::Skip, None)
    }

    /// Press one of the tooltip's own controls (primary, back, close, skip).
    pub fn press(&self, action: Action) -> Result<bool, TourError> {
        self.dispatch(|controller| controller.press(action))
    }

    pub fn open(&self) -> Result<bool, TourError> {
        self.dispatch(|controller| controller.open())
    }

    pub fn reset(&self) -> Result<(), TourError> {
        self.dispatch(|controller| {
            controller.reset();
            Ok(())
        })
    }

    /// Fire the settle timer if it is due now.
    pub fn poll_settle(&self) -> Result<bool, TourError> {
        self.dispatch(|controller| Ok(controller.poll_settle(Instant::now())))
    }

    /// Wait for the pending settle delay, then fire it.
    pub async fn settle(&self) -> Result<bool, TourError> {
        let deadline = self
            .shared
            .controller
            .try_borrow()
            .map_err(|_| TourError::Reentrancy)?
            .settle_deadline();
        if let Some(deadline) = deadline {
            tokio::time::sleep_until(deadline).await;
        }
        self.poll_settle()
    }

    /// Current state. Inside the callback this is the state published for
    /// the event being delivered.
    pub fn snapshot(&self) -> Result<TourSnapshot, TourError> {
        match self.shared.controller.try_borrow() {
            Ok(controller) => Ok(controller.snapshot()),
            Err(_) => self.shared.mailbox.view().ok_or(TourError::Reentrancy),
        }
    }

    /// Queue a command. Safe to call from inside the callback; the queue is
    /// drained one request at a time once the current operation commits.
    /// A STOP or SKIP queued from the callback also ends the running
    /// sequence before any further step is presented.
    pub fn request(&self, action: Action, index: Option<usize>) {
        self.shared.mailbox.push(HostRequest { action, index });
        if self.shared.controller.try_borrow_mut().is_ok() {
            self.drain_requests();
        }
    }

    /// Queued requests that were rejected, oldest first. Only the last
    /// `REJECTED_CAPACITY` are kept, so drain this regularly.
    pub fn take_rejected(&self) -> Vec<(HostRequest, TourError)> {
        self.shared.rejected.borrow_mut().drain(..).collect()
    }

    fn dispatch<T>(
        &self,
        operation: impl FnOnce(&mut TourController<R>) -> Result<T, TourError>,
    ) -> Result<T, TourError> {
        let result = {
            let mut controller = self.shared.controller.try_borrow_mut().map_err(|_| {
                error!("Tour called from inside its own callback; use Tour::request instead");
                TourError::Reentrancy
            })?;
            operation(&mut controller)
        };
        self.drain_requests();
        result
    }

    fn drain_requests(&self) {
        loop {
            let Some(request) = self.shared.mailbox.pop() else {
                break;
            };
            let outcome = match self.shared.controller.try_borrow_mut() {
                Ok(mut controller) => controller.advance(request.action, request.index),
                Err(_) => {
                    // Someone further up the stack holds the tour; they drain when done.
                    self.shared.mailbox.push_front(request);
                    break;
                }
            };
            if let Err(e) = outcome {
                warn!(action = %request.action, index = ?request.index, error = %e, "Queued host request rejected");
                let mut rejected = self.shared.rejected.borrow_mut();
                if rejected.len() == REJECTED_CAPACITY {
                    rejected.pop_front();
                }
                rejected.push_back((request, e));
            }
        }
    }
}
