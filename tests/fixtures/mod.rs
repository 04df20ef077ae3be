// Shared helpers for tour integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tourguide::{
    Action, CallbackEvent, EventType, Lifecycle, StaticResolver, Status, StepCatalog,
    StepDescriptor, Tour, TourOptions,
};

/// Compact view of an event for sequence assertions.
pub type Row = (EventType, Action, usize, Lifecycle, Status);

pub fn row(event: &CallbackEvent) -> Row {
    (event.event_type, event.action, event.index, event.lifecycle, event.status)
}

pub fn rows(events: &[CallbackEvent]) -> Vec<Row> {
    events.iter().map(row).collect()
}

/// Catalog of `size` steps targeting `#step-0`, `#step-1`, ...
pub fn numbered_catalog(size: usize) -> StepCatalog {
    let steps = (0..size)
        .map(|i| {
            StepDescriptor::new(format!("#step-{i}"), format!("Step {} body", i + 1))
                .with_title(format!("Step {}", i + 1))
        })
        .collect();
    StepCatalog::new(steps).expect("fixture catalog is not empty")
}

pub fn sync_options() -> TourOptions {
    TourOptions::default().with_settle_delay(Duration::ZERO)
}

/// Shared, clonable event log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<CallbackEvent>>>,
}

impl Recorder {
    pub fn push(&self, event: &CallbackEvent) {
        self.events.borrow_mut().push(event.clone());
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn all(&self) -> Vec<CallbackEvent> {
        self.events.borrow().clone()
    }

    pub fn since(&self, start: usize) -> Vec<CallbackEvent> {
        self.events.borrow()[start..].to_vec()
    }
}

/// Tour with a recording callback attached.
pub fn recording_tour(
    catalog: StepCatalog,
    options: TourOptions,
    resolver: StaticResolver,
) -> (Tour<StaticResolver>, Recorder) {
    let tour = Tour::new(catalog, options, resolver);
    let recorder = Recorder::default();
    let sink = recorder.clone();
    tour.on_event(move |event| sink.push(event))
        .expect("callback can be attached outside an emission");
    (tour, recorder)
}
