// Tour Run Controller - owns status, index and the active run; every
// committed transition is reported through the emitter

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{MissingTargetPolicy, StepCatalog, TourOptions};
use crate::telemetry::create_tour_span;
use crate::tour::classify::{classify, RunDecision};
use crate::tour::emitter::{EventEmitter, TransitionFacts};
use crate::tour::errors::TourError;
use crate::tour::state_machine::{Completion, StepLifecycleMachine};
use crate::tour::timer::SettleTimer;
use crate::tour::traits::{TargetResolution, TargetResolver};
use crate::tour::types::{Action, CallbackEvent, EventType, Lifecycle, Status, TourRun, TourSnapshot};

/// What a validated navigation request will do. Computed before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Finish,
    Stay,
    Move(usize),
    Restart(usize),
}

pub struct TourController<R: TargetResolver> {
    catalog: StepCatalog,
    options: TourOptions,
    resolver: R,
    emitter: EventEmitter,
    status: Status,
    run: Option<TourRun>,
    step: StepLifecycleMachine,
    timer: SettleTimer,
    pause_notice_pending: bool,
    last_action: Option<Action>,
    error: Option<TourError>,
}

impl<R: TargetResolver> std::fmt::Debug for TourController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourController")
            .field("status", &self.status)
            .field("run", &self.run)
            .field("step", &self.step)
            .field("timer", &self.timer)
            .field("pause_notice_pending", &self.pause_notice_pending)
            .field("last_action", &self.last_action)
            .finish_non_exhaustive()
    }
}

impl<R: TargetResolver> TourController<R> {
    pub fn new(catalog: StepCatalog, options: TourOptions, resolver: R, emitter: EventEmitter) -> Self {
        Self {
            catalog,
            options,
            resolver,
            emitter,
            status: Status::Idle,
            run: None,
            step: StepLifecycleMachine::new(),
            timer: SettleTimer::new(),
            pause_notice_pending: false,
            last_action: None,
            error: None,
        }
    }

    pub fn set_callback(&mut self, callback: impl FnMut(&CallbackEvent) + 'static) {
        self.emitter.set_callback(callback);
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn index(&self) -> usize {
        self.step.index()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.step.lifecycle()
    }

    pub fn size(&self) -> usize {
        self.catalog.size()
    }

    pub fn run(&self) -> Option<TourRun> {
        self.run
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &TourOptions {
        &self.options
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn events_emitted(&self) -> u64 {
        self.emitter.emitted()
    }

    pub fn snapshot(&self) -> TourSnapshot {
        TourSnapshot {
            run_id: self.run.map(|run| run.id),
            status: self.status,
            index: self.step.index(),
            lifecycle: self.step.lifecycle(),
            size: self.catalog.size(),
            last_action: self.last_action,
            pending_settle: self.timer.is_pending(),
            error: self.error.clone(),
        }
    }

    /// Begin a new run at `index`.
    pub fn start(&mut self, index: usize) -> Result<(), TourError> {
        let _span = create_tour_span("start", self.run.map(|run| run.id), Some(index)).entered();

        if self.status == Status::Running {
            return Err(TourError::AlreadyRunning {
                run_id: self.run.map(|run| run.id).unwrap_or_else(Uuid::nil),
            });
        }
        self.catalog.get(index)?;

        let step_action = self.resume_action(Action::Start);
        self.flush_pause_notice();
        self.begin_run(index, step_action)
    }

    /// Central decision point for every host or control action.
    pub fn advance(&mut self, action: Action, requested: Option<usize>) -> Result<(), TourError> {
        let _span = create_tour_span("advance", self.run.map(|run| run.id), requested).entered();

        match (self.status, action) {
            (_, Action::Reset) => {
                self.reset();
                Ok(())
            }
            (_, Action::Start) => self.start(requested.unwrap_or(self.step.index())),
            (Status::Idle, _) => Err(TourError::NotStarted),
            (Status::Running, Action::Stop) => {
                self.flush_pause_notice();
                self.pause();
                Ok(())
            }
            (Status::Paused | Status::Skipped | Status::Finished | Status::Error, Action::Stop) => {
                self.flush_pause_notice();
                Ok(())
            }
            (status, Action::Skip) if status.is_terminal() => {
                Err(TourError::RunTerminated { status })
            }
            // Includes runs halted on a missing target.
            (_, Action::Skip) => {
                self.flush_pause_notice();
                self.skip();
                Ok(())
            }
            (_, Action::Next | Action::Prev | Action::Go | Action::Close | Action::Update) => {
                self.navigate(action, requested)
            }
        }
    }

    /// A press on the tooltip's own controls. In controlled mode NEXT, PREV and
    /// CLOSE only complete the step; the host then supplies the next index.
    /// Returns false when no tooltip or beacon is showing.
    pub fn press(&mut self, action: Action) -> Result<bool, TourError> {
        let _span = create_tour_span("press", self.run.map(|run| run.id), None).entered();

        match action {
            Action::Next | Action::Prev | Action::Close => {}
            Action::Skip => return self.advance(action, None).map(|()| true),
            _ => return Err(TourError::InvalidControl { action }),
        }
        if !self.options.controlled {
            return self.advance(action, None).map(|()| true);
        }
        if self.status == Status::Idle {
            return Err(TourError::NotStarted);
        }
        let showing = matches!(self.step.lifecycle(), Lifecycle::Ready | Lifecycle::Tooltip);
        if self.status != Status::Running || !showing {
            self.flush_pause_notice();
            return Ok(false);
        }

        let target = self.target_index(action, None)?;
        self.flush_pause_notice();
        if target.is_none() {
            self.finish(action);
            return Ok(true);
        }
        self.timer.cancel();
        self.complete_step(action);
        debug!(index = self.step.index(), action = %action, "Waiting for the host to supply the next step");
        Ok(true)
    }

    /// Open the tooltip of a step waiting at READY (discrete mode beacon click).
    pub fn open(&mut self) -> Result<bool, TourError> {
        if self.status == Status::Idle {
            return Err(TourError::NotStarted);
        }
        self.flush_pause_notice();

        if self.status != Status::Running
            || self.step.lifecycle() != Lifecycle::Ready
            || self.timer.is_pending()
        {
            return Ok(false);
        }
        let delay = self.settle_delay_for_current();
        self.schedule_settle(delay);
        Ok(true)
    }

    /// Fire the pending settle ticket if it is due. Stale tickets are dropped.
    pub fn poll_settle(&mut self, now: Instant) -> bool {
        self.flush_pause_notice();

        let Some(ticket) = self.timer.take_due(now) else {
            return false;
        };
        let current = self.run.map(|run| run.id);
        let is_current =
            current.is_some_and(|run_id| ticket.matches(run_id, self.step.index()));
        if self.status != Status::Running || !is_current {
            debug!(index = ticket.index, run_id = %ticket.run_id, "Dropped stale settle ticket");
            return false;
        }
        self.fire_settle()
    }

    /// Hard reset to the pre-run state. Emits nothing.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.status = Status::Idle;
        self.run = None;
        self.step = StepLifecycleMachine::new();
        self.pause_notice_pending = false;
        self.last_action = None;
        self.error = None;
        info!("Tour reset");
    }

    fn navigate(&mut self, action: Action, requested: Option<usize>) -> Result<(), TourError> {
        let current = self.step.index();
        let target = self.target_index(action, requested)?;
        let decision = classify(self.status, current, target, action, self.catalog.size())?;

        let plan = match (decision, target) {
            (RunDecision::Continue, None) => Plan::Finish,
            (RunDecision::Continue, Some(index)) if index == current && action == Action::Update => {
                Plan::Stay
            }
            (RunDecision::Continue, Some(index)) => Plan::Move(index),
            (RunDecision::Restart, Some(index)) => Plan::Restart(index),
            (RunDecision::Restart, None) => {
                return Err(TourError::RunTerminated { status: self.status })
            }
        };

        let step_action = self.resume_action(action);
        self.flush_pause_notice();
        match plan {
            Plan::Finish => self.finish(action),
            Plan::Stay => debug!(index = current, "Host confirmed the current step"),
            Plan::Move(index) => self.move_to(index, action, step_action)?,
            Plan::Restart(index) => self.begin_run(index, step_action)?,
        }
        Ok(())
    }

    /// Resolve the index an action points at. `None` means past the final step.
    fn target_index(&self, action: Action, requested: Option<usize>) -> Result<Option<usize>, TourError> {
        let current = self.step.index();
        let size = self.catalog.size();

        let index = match (action, requested) {
            (_, Some(index)) => index,
            (Action::Next | Action::Close, None) => {
                if current == self.catalog.last_index() {
                    return Ok(None);
                }
                current + 1
            }
            (Action::Prev, None) => match current.checked_sub(1) {
                Some(index) => index,
                None => return Err(TourError::IndexOutOfRange { index: -1, size }),
            },
            (_, None) => return Err(TourError::MissingIndex { action }),
        };

        self.catalog.get(index)?;
        Ok(Some(index))
    }

    /// STEP_BEFORE action used when a run (re)starts.
    fn resume_action(&self, requested: Action) -> Action {
        if requested.is_navigation() {
            return requested;
        }
        let live = matches!(self.status, Status::Running | Status::Paused);
        match self.step.completion() {
            Some(done) if live && done.action.is_navigation() => done.action,
            _ => Action::Update,
        }
    }

    fn begin_run(&mut self, index: usize, step_action: Action) -> Result<(), TourError> {
        self.timer.cancel();
        self.step.enter(&self.catalog, index)?;

        let run = TourRun::new(self.catalog.size(), self.options.continuous);
        self.run = Some(run);
        self.status = Status::Running;
        self.error = None;
        self.last_action = Some(Action::Start);
        info!(run_id = %run.id, index, size = run.size, "Tour run started");

        self.emit(EventType::TourStart, Action::Start);
        if self.host_interrupted() {
            return Ok(());
        }
        self.present(step_action);
        Ok(())
    }

    fn move_to(&mut self, index: usize, action: Action, step_action: Action) -> Result<(), TourError> {
        self.timer.cancel();
        if self.complete_step(action) && self.host_interrupted() {
            return Ok(());
        }
        self.step.enter(&self.catalog, index)?;
        self.last_action = Some(step_action);
        self.present(step_action);
        Ok(())
    }

    /// Complete the active step; true when a STEP_AFTER was emitted.
    fn complete_step(&mut self, action: Action) -> bool {
        match self.step.complete(action) {
            Completion::Completed(done) => {
                self.last_action = Some(action);
                debug!(index = done.index, action = %action, "Step completed");
                self.emit(EventType::StepAfter, action);
                true
            }
            Completion::AlreadyCompleted(done) => {
                debug!(index = done.index, first = %done.action, "Step was already complete");
                false
            }
            Completion::NotCompletable(lifecycle) => {
                debug!(index = self.step.index(), %lifecycle, "Step left without completing");
                false
            }
        }
    }

    /// The pause confirmation is delivered on its own: if this pause emitted
    /// the STEP_AFTER, TOUR_STATUS waits for the next entry into the controller.
    fn pause(&mut self) {
        self.timer.cancel();
        self.status = Status::Paused;
        let completed_now = self.complete_step(Action::Stop);
        self.last_action = Some(Action::Stop);
        info!(index = self.step.index(), "Tour paused");
        if completed_now {
            self.pause_notice_pending = true;
        } else {
            self.emit(EventType::TourStatus, Action::Stop);
        }
    }

    fn skip(&mut self) {
        self.timer.cancel();
        self.status = Status::Skipped;
        self.complete_step(Action::Skip);
        self.last_action = Some(Action::Skip);
        info!(index = self.step.index(), "Tour skipped");
        self.emit(EventType::TourEnd, Action::Skip);
    }

    fn finish(&mut self, action: Action) {
        self.timer.cancel();
        self.complete_step(action);
        self.status = Status::Finished;
        self.last_action = Some(Action::Update);
        info!(index = self.step.index(), "Tour finished");
        self.emit(EventType::TourEnd, Action::Update);
    }

    /// Resolve the active step's target and drive it to READY (and on to
    /// TOOLTIP when it opens immediately). Missing targets follow the policy.
    fn present(&mut self, action: Action) {
        let mut action = action;
        loop {
            let index = self.step.index();
            let Ok(step) = self.catalog.get(index) else {
                return;
            };
            let resolution = self.resolver.resolve(step);
            let opens = self.options.opens_immediately(step);
            let delay = self.options.settle_delay_for(step);
            let policy = self.options.missing_target_for(step);
            let target = step.target.clone();

            self.step.prepare();
            match resolution {
                TargetResolution::Found(handle) => {
                    self.resolver.scroll_into_view(&handle);
                    self.emit(EventType::StepBefore, action);
                    if opens && !self.host_interrupted() {
                        self.schedule_settle(delay);
                    }
                    return;
                }
                TargetResolution::NotFound => {
                    self.step.miss();
                    warn!(index, target = %target, policy = ?policy, "Step target not found");
                    self.error = Some(TourError::TargetNotFound { index, target });

                    let direction = if action == Action::Prev { Action::Prev } else { Action::Next };
                    let neighbour = match direction {
                        Action::Prev => index.checked_sub(1),
                        _ => Some(index + 1).filter(|next| self.catalog.contains(*next)),
                    };

                    match (policy, neighbour) {
                        (MissingTargetPolicy::SkipToNext, Some(next)) => {
                            self.last_action = Some(direction);
                            self.emit(EventType::Error, direction);
                            if self.host_interrupted() {
                                return;
                            }
                            if self.step.enter(&self.catalog, next).is_err() {
                                return;
                            }
                            action = direction;
                        }
                        _ => {
                            self.status = Status::Error;
                            self.last_action = Some(Action::Stop);
                            self.emit(EventType::Error, Action::Stop);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn settle_delay_for_current(&self) -> Duration {
        self.catalog
            .get(self.step.index())
            .map(|step| self.options.settle_delay_for(step))
            .unwrap_or(self.options.settle_delay)
    }

    fn schedule_settle(&mut self, delay: Duration) {
        let Some(run) = self.run else {
            return;
        };
        if delay.is_zero() {
            self.timer.cancel();
            self.fire_settle();
            return;
        }
        self.timer.schedule(run.id, self.step.index(), delay, Instant::now());
    }

    fn fire_settle(&mut self) -> bool {
        if !self.step.settle() {
            return false;
        }
        self.last_action = Some(Action::Update);
        self.emit(EventType::Tooltip, Action::Update);
        true
    }

    fn flush_pause_notice(&mut self) {
        if std::mem::take(&mut self.pause_notice_pending) {
            self.emit(EventType::TourStatus, Action::Stop);
        }
    }

    fn emit(&mut self, event_type: EventType, action: Action) {
        let Ok(step) = self.catalog.get(self.step.index()) else {
            return;
        };
        let facts = TransitionFacts {
            run_id: self.run.map(|run| run.id).unwrap_or_else(Uuid::nil),
            index: self.step.index(),
            lifecycle: self.step.lifecycle(),
            status: self.status,
            size: self.catalog.size(),
            step,
            controlled: self.options.controlled,
        };
        let event = facts.record(event_type, action);
        self.emitter.publish(self.snapshot());
        self.emitter.emit(event);
    }

    /// A STOP or SKIP queued by the callback just delivered ends the
    /// sequence here; the handle applies it once this operation returns.
    fn host_interrupted(&self) -> bool {
        let interrupted = self.emitter.interrupt_requested();
        if interrupted {
            debug!(index = self.step.index(), "Sequence cut short by host request");
        }
        interrupted
    }
}
