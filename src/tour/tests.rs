// Tests for the tour run controller

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::time::Duration;

    use tokio::time::Instant;

    use super::super::controller::TourController;
    use super::super::emitter::{EventEmitter, HostMailbox, HostRequest};
    use super::super::errors::TourError;
    use super::super::mocks::*;
    use super::super::types::*;
    use crate::catalog::{MissingTargetPolicy, StepOverrides, TourOptions};

    type Row = (EventType, Action, usize, Lifecycle, Status);

    fn sync_options() -> TourOptions {
        TourOptions::default().with_settle_delay(Duration::ZERO)
    }

    fn setup(
        size: usize,
        options: TourOptions,
    ) -> (TourController<Rc<MockTargetResolver>>, EventLog, Rc<MockTargetResolver>) {
        let log = EventLog::new();
        let resolver = Rc::new(MockTargetResolver::new());
        let controller = TourController::new(
            numbered_catalog(size),
            options,
            Rc::clone(&resolver),
            EventEmitter::new(log.callback()),
        );
        (controller, log, resolver)
    }

    fn rows(events: &[CallbackEvent]) -> Vec<Row> {
        events
            .iter()
            .map(|e| (e.event_type, e.action, e.index, e.lifecycle, e.status))
            .collect()
    }

    use super::super::types::{Action as A, EventType as E, Lifecycle as L, Status as S};

    #[test]
    fn test_start_emits_start_sequence() {
        let (mut tour, log, _) = setup(6, sync_options());

        tour.start(0).unwrap();

        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::TourStart, A::Start, 0, L::Init, S::Running),
                (E::StepBefore, A::Update, 0, L::Ready, S::Running),
                (E::Tooltip, A::Update, 0, L::Tooltip, S::Running),
            ]
        );
        assert_eq!(tour.status(), S::Running);
        assert_eq!(tour.lifecycle(), L::Tooltip);
        assert_eq!(tour.events_emitted(), 3);
    }

    #[test]
    fn test_scenario_pause_restart_navigate_finish() {
        let (mut tour, log, _) = setup(6, sync_options());

        tour.start(0).unwrap();
        log.drain();

        tour.advance(A::Stop, None).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![(E::StepAfter, A::Stop, 0, L::Complete, S::Paused)]
        );

        tour.start(1).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::TourStatus, A::Stop, 0, L::Complete, S::Paused),
                (E::TourStart, A::Start, 1, L::Init, S::Running),
                (E::StepBefore, A::Update, 1, L::Ready, S::Running),
                (E::Tooltip, A::Update, 1, L::Tooltip, S::Running),
            ]
        );

        tour.advance(A::Next, None).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Next, 1, L::Complete, S::Running),
                (E::StepBefore, A::Next, 2, L::Ready, S::Running),
                (E::Tooltip, A::Update, 2, L::Tooltip, S::Running),
            ]
        );

        tour.advance(A::Prev, None).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Prev, 2, L::Complete, S::Running),
                (E::StepBefore, A::Prev, 1, L::Ready, S::Running),
                (E::Tooltip, A::Update, 1, L::Tooltip, S::Running),
            ]
        );

        tour.advance(A::Go, Some(5)).unwrap();
        log.drain();

        tour.advance(A::Next, None).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Next, 5, L::Complete, S::Running),
                (E::TourEnd, A::Update, 5, L::Complete, S::Finished),
            ]
        );
        assert_eq!(tour.status(), S::Finished);
    }

    #[test]
    fn test_all_events_of_a_run_share_its_id() {
        let (mut tour, log, _) = setup(3, sync_options());

        tour.start(0).unwrap();
        tour.advance(A::Next, None).unwrap();
        let first_run = tour.run().unwrap().id;
        tour.advance(A::Stop, None).unwrap();
        tour.advance(A::Update, Some(2)).unwrap();
        let second_run = tour.run().unwrap().id;

        assert_ne!(first_run, second_run);
        let events = log.all();
        let restart = events
            .iter()
            .position(|e| e.event_type == E::TourStart && e.index == 2)
            .unwrap();
        assert!(events[..restart].iter().all(|e| e.run_id == first_run));
        assert!(events[restart..].iter().all(|e| e.run_id == second_run));
        assert!(events.iter().all(|e| e.size == 3 && e.controlled));
    }

    #[test]
    fn test_close_at_final_index_finishes() {
        let (mut tour, log, _) = setup(2, sync_options());
        tour.start(1).unwrap();
        log.drain();

        tour.advance(A::Close, None).unwrap();

        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Close, 1, L::Complete, S::Running),
                (E::TourEnd, A::Update, 1, L::Complete, S::Finished),
            ]
        );
        assert_eq!(
            tour.advance(A::Next, None),
            Err(TourError::RunTerminated { status: S::Finished })
        );
    }

    #[test]
    fn test_out_of_range_requests_change_nothing() {
        let (mut tour, log, _) = setup(6, sync_options());

        assert_eq!(
            tour.start(6),
            Err(TourError::IndexOutOfRange { index: 6, size: 6 })
        );
        assert_eq!(log.len(), 0);
        assert_eq!(tour.status(), S::Idle);

        tour.start(0).unwrap();
        log.drain();
        let before = tour.snapshot();

        assert_eq!(
            tour.advance(A::Prev, None),
            Err(TourError::IndexOutOfRange { index: -1, size: 6 })
        );
        assert_eq!(
            tour.advance(A::Go, Some(9)),
            Err(TourError::IndexOutOfRange { index: 9, size: 6 })
        );
        assert_eq!(
            tour.advance(A::Go, None),
            Err(TourError::MissingIndex { action: A::Go })
        );
        assert_eq!(log.len(), 0);
        assert_eq!(tour.snapshot(), before);
    }

    #[test]
    fn test_start_while_running_is_rejected() {
        let (mut tour, log, _) = setup(3, sync_options());
        tour.start(0).unwrap();
        let run_id = tour.run().unwrap().id;
        log.drain();

        assert_eq!(tour.start(1), Err(TourError::AlreadyRunning { run_id }));
        assert_eq!(log.len(), 0);
        assert_eq!(tour.index(), 0);
    }

    #[test]
    fn test_advance_before_start_is_rejected() {
        let (mut tour, log, _) = setup(3, sync_options());

        assert_eq!(tour.advance(A::Next, None), Err(TourError::NotStarted));
        assert_eq!(tour.advance(A::Stop, None), Err(TourError::NotStarted));
        assert_eq!(tour.open(), Err(TourError::NotStarted));
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn test_skip_ends_the_run() {
        let (mut tour, log, _) = setup(4, sync_options());
        tour.start(1).unwrap();
        log.drain();

        tour.advance(A::Skip, None).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Skip, 1, L::Complete, S::Skipped),
                (E::TourEnd, A::Skip, 1, L::Complete, S::Skipped),
            ]
        );

        // Skipped runs never restart through navigation.
        assert_eq!(
            tour.advance(A::Update, Some(2)),
            Err(TourError::RunTerminated { status: S::Skipped })
        );
        assert_eq!(
            tour.advance(A::Skip, None),
            Err(TourError::RunTerminated { status: S::Skipped })
        );
        assert_eq!(log.len(), 0);

        // An explicit start does.
        tour.start(0).unwrap();
        assert_eq!(log.drain()[0].event_type, E::TourStart);
    }

    #[test]
    fn test_skip_while_paused_confirms_pause_first() {
        let (mut tour, log, _) = setup(4, sync_options());
        tour.start(0).unwrap();
        tour.advance(A::Stop, None).unwrap();
        log.drain();

        tour.advance(A::Skip, None).unwrap();

        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::TourStatus, A::Stop, 0, L::Complete, S::Paused),
                (E::TourEnd, A::Skip, 0, L::Complete, S::Skipped),
            ]
        );
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut tour, log, _) = setup(3, sync_options());
        tour.start(0).unwrap();
        log.drain();

        tour.advance(A::Stop, None).unwrap();
        tour.advance(A::Stop, None).unwrap();
        tour.advance(A::Stop, None).unwrap();

        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Stop, 0, L::Complete, S::Paused),
                (E::TourStatus, A::Stop, 0, L::Complete, S::Paused),
            ]
        );
    }

    #[test]
    fn test_restart_after_confirmed_pause_begins_with_tour_start() {
        let (mut tour, log, _) = setup(6, sync_options());
        tour.start(2).unwrap();
        tour.advance(A::Stop, None).unwrap();
        tour.poll_settle(Instant::now());
        log.drain();

        tour.advance(A::Update, Some(5)).unwrap();

        let events = log.drain();
        assert_eq!(
            rows(&events[..1]),
            vec![(E::TourStart, A::Start, 5, L::Init, S::Running)]
        );
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_update_to_current_index_is_a_no_op() {
        let (mut tour, log, _) = setup(3, sync_options());
        tour.start(1).unwrap();
        log.drain();

        tour.advance(A::Update, Some(1)).unwrap();

        assert_eq!(log.len(), 0);
        assert_eq!(tour.lifecycle(), L::Tooltip);
    }

    #[test]
    fn test_controlled_press_waits_for_host_index() {
        let (mut tour, log, _) = setup(4, sync_options());
        tour.start(0).unwrap();
        log.drain();

        assert!(tour.press(A::Next).unwrap());
        assert_eq!(
            rows(&log.drain()),
            vec![(E::StepAfter, A::Next, 0, L::Complete, S::Running)]
        );
        assert_eq!(tour.index(), 0);

        // Pressing again does not complete the step twice.
        assert!(!tour.press(A::Next).unwrap());
        assert_eq!(log.len(), 0);

        tour.advance(A::Update, Some(1)).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepBefore, A::Next, 1, L::Ready, S::Running),
                (E::Tooltip, A::Update, 1, L::Tooltip, S::Running),
            ]
        );
    }

    #[test]
    fn test_pause_after_press_confirms_immediately_and_carries_action() {
        let (mut tour, log, _) = setup(4, sync_options());
        tour.start(1).unwrap();
        tour.press(A::Next).unwrap();
        log.drain();

        tour.advance(A::Stop, None).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![(E::TourStatus, A::Stop, 1, L::Complete, S::Paused)]
        );

        tour.advance(A::Update, Some(2)).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::TourStart, A::Start, 2, L::Init, S::Running),
                (E::StepBefore, A::Next, 2, L::Ready, S::Running),
                (E::Tooltip, A::Update, 2, L::Tooltip, S::Running),
            ]
        );
    }

    #[test]
    fn test_uncontrolled_press_navigates() {
        let (mut tour, log, _) = setup(3, sync_options().with_controlled(false));
        tour.start(0).unwrap();
        log.drain();

        tour.press(A::Next).unwrap();

        let events = log.drain();
        assert_eq!(events.len(), 3);
        assert_eq!(tour.index(), 1);
        assert!(events.iter().all(|e| !e.controlled));
    }

    #[test]
    fn test_press_rejects_non_control_actions() {
        let (mut tour, _, _) = setup(3, sync_options());
        tour.start(0).unwrap();

        assert_eq!(
            tour.press(A::Go),
            Err(TourError::InvalidControl { action: A::Go })
        );
        assert_eq!(
            tour.press(A::Prev),
            Err(TourError::IndexOutOfRange { index: -1, size: 3 })
        );
    }

    #[test]
    fn test_missing_target_skips_forward() {
        let (mut tour, log, resolver) = setup(4, sync_options());
        resolver.set_missing("#step-1", true);
        tour.start(0).unwrap();
        log.drain();

        tour.advance(A::Next, None).unwrap();

        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Next, 0, L::Complete, S::Running),
                (E::Error, A::Next, 1, L::Error, S::Running),
                (E::StepBefore, A::Next, 2, L::Ready, S::Running),
                (E::Tooltip, A::Update, 2, L::Tooltip, S::Running),
            ]
        );
        assert_eq!(
            tour.snapshot().error,
            Some(TourError::TargetNotFound {
                index: 1,
                target: "#step-1".to_string()
            })
        );
    }

    #[test]
    fn test_missing_targets_skip_backward_in_a_row() {
        let (mut tour, log, resolver) = setup(5, sync_options());
        tour.start(4).unwrap();
        resolver.set_missing("#step-3", true);
        resolver.set_missing("#step-2", true);
        log.drain();

        tour.advance(A::Prev, None).unwrap();

        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Prev, 4, L::Complete, S::Running),
                (E::Error, A::Prev, 3, L::Error, S::Running),
                (E::Error, A::Prev, 2, L::Error, S::Running),
                (E::StepBefore, A::Prev, 1, L::Ready, S::Running),
                (E::Tooltip, A::Update, 1, L::Tooltip, S::Running),
            ]
        );
    }

    #[test]
    fn test_missing_target_halts_by_policy() {
        let options = sync_options().with_missing_target(MissingTargetPolicy::Halt);
        let (mut tour, log, resolver) = setup(4, options);
        resolver.set_missing("#step-1", true);
        tour.start(0).unwrap();
        log.drain();

        tour.advance(A::Next, None).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Next, 0, L::Complete, S::Running),
                (E::Error, A::Stop, 1, L::Error, S::Error),
            ]
        );
        assert_eq!(tour.index(), 1);

        // The host recovers by supplying another index.
        tour.advance(A::Update, Some(2)).unwrap();
        let events = log.drain();
        assert_eq!(events[0].event_type, E::TourStart);
        assert_eq!(tour.status(), S::Running);
        assert_eq!(tour.snapshot().error, None);
    }

    #[test]
    fn test_missing_final_target_halts_even_when_skipping() {
        let (mut tour, log, resolver) = setup(2, sync_options());
        resolver.set_missing("#step-1", true);
        tour.start(0).unwrap();
        log.drain();

        tour.advance(A::Next, None).unwrap();

        let events = rows(&log.drain());
        assert_eq!(events.last(), Some(&(E::Error, A::Stop, 1, L::Error, S::Error)));
        assert!(events.iter().all(|row| row.0 != E::TourEnd));
    }

    #[test]
    fn test_halted_run_can_still_be_skipped() {
        let options = sync_options().with_missing_target(MissingTargetPolicy::Halt);
        let (mut tour, log, resolver) = setup(4, options);
        resolver.set_missing("#step-1", true);
        tour.start(0).unwrap();
        tour.advance(A::Next, None).unwrap();
        assert_eq!(tour.status(), S::Error);
        log.drain();

        tour.advance(A::Skip, None).unwrap();

        assert_eq!(
            rows(&log.drain()),
            vec![(E::TourEnd, A::Skip, 1, L::Error, S::Skipped)]
        );
        assert_eq!(
            tour.advance(A::Skip, None),
            Err(TourError::RunTerminated { status: S::Skipped })
        );
    }

    #[test]
    fn test_queued_skip_stops_presenting_the_step() {
        let mailbox = Rc::new(HostMailbox::new());
        let inbox = Rc::clone(&mailbox);
        let log = EventLog::new();
        let mut record = log.callback();
        let mut emitter = EventEmitter::new(move |event: &CallbackEvent| {
            record(event);
            if event.event_type == EventType::StepBefore {
                inbox.push(HostRequest {
                    action: Action::Skip,
                    index: None,
                });
            }
        });
        emitter.attach_mailbox(Rc::clone(&mailbox));
        let mut tour = TourController::new(
            numbered_catalog(3),
            sync_options(),
            Rc::new(MockTargetResolver::new()),
            emitter,
        );

        tour.start(0).unwrap();

        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::TourStart, A::Start, 0, L::Init, S::Running),
                (E::StepBefore, A::Update, 0, L::Ready, S::Running),
            ]
        );
        let queued = mailbox.pop().unwrap();
        assert_eq!(queued.action, A::Skip);
        assert_eq!(mailbox.view().map(|view| view.lifecycle), Some(L::Ready));

        tour.advance(queued.action, queued.index).unwrap();
        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::StepAfter, A::Skip, 0, L::Complete, S::Skipped),
                (E::TourEnd, A::Skip, 0, L::Complete, S::Skipped),
            ]
        );
    }

    #[test]
    fn test_discrete_mode_waits_for_open() {
        let (mut tour, log, _) = setup(3, sync_options().with_continuous(false));
        tour.start(0).unwrap();

        assert_eq!(
            rows(&log.drain()),
            vec![
                (E::TourStart, A::Start, 0, L::Init, S::Running),
                (E::StepBefore, A::Update, 0, L::Ready, S::Running),
            ]
        );

        assert!(tour.open().unwrap());
        assert!(!tour.open().unwrap());
        assert_eq!(
            rows(&log.drain()),
            vec![(E::Tooltip, A::Update, 0, L::Tooltip, S::Running)]
        );
    }

    #[test]
    fn test_skip_beacon_override_opens_immediately() {
        let log = EventLog::new();
        let mut steps = numbered_catalog(2).steps().to_vec();
        steps[1] = steps[1].clone().with_overrides(StepOverrides {
            skip_beacon: true,
            ..StepOverrides::default()
        });
        let mut tour = TourController::new(
            crate::catalog::StepCatalog::new(steps).unwrap(),
            sync_options().with_continuous(false),
            MockTargetResolver::new(),
            EventEmitter::new(log.callback()),
        );

        tour.start(0).unwrap();
        tour.advance(A::Next, None).unwrap();

        assert_eq!(log.all().last().map(|e| e.event_type), Some(E::Tooltip));
        assert_eq!(tour.lifecycle(), L::Tooltip);
    }

    #[test]
    fn test_settle_delay_is_cancelled_by_navigation() {
        let options = TourOptions::default().with_settle_delay(Duration::from_millis(100));
        let (mut tour, log, _) = setup(3, options);
        let began = Instant::now();

        tour.start(0).unwrap();
        assert_eq!(log.len(), 2);
        assert!(tour.snapshot().pending_settle);
        assert!(!tour.poll_settle(began));

        tour.advance(A::Next, None).unwrap();
        let later = began + Duration::from_secs(5);
        assert!(tour.poll_settle(later));
        assert!(!tour.poll_settle(later));

        let tooltips: Vec<usize> = log
            .all()
            .iter()
            .filter(|e| e.event_type == E::Tooltip)
            .map(|e| e.index)
            .collect();
        assert_eq!(tooltips, vec![1]);
    }

    #[test]
    fn test_pause_cancels_pending_settle() {
        let options = TourOptions::default().with_settle_delay(Duration::from_millis(100));
        let (mut tour, log, _) = setup(3, options);

        tour.start(0).unwrap();
        tour.advance(A::Stop, None).unwrap();

        assert!(!tour.snapshot().pending_settle);
        assert!(!tour.poll_settle(Instant::now() + Duration::from_secs(1)));
        assert!(log.all().iter().all(|e| e.event_type != E::Tooltip));
    }

    #[test]
    fn test_reset_is_silent_and_discards_pause_notice() {
        let (mut tour, log, _) = setup(3, sync_options());
        tour.start(0).unwrap();
        tour.advance(A::Stop, None).unwrap();
        log.drain();

        tour.advance(A::Reset, None).unwrap();
        assert_eq!(log.len(), 0);
        assert_eq!(tour.status(), S::Idle);
        assert_eq!(tour.run(), None);

        tour.start(2).unwrap();
        assert_eq!(log.drain()[0].event_type, E::TourStart);
    }

    #[test]
    fn test_resolver_is_asked_then_scrolls() {
        let (mut tour, _, resolver) = setup(2, sync_options());

        tour.start(1).unwrap();

        assert_eq!(
            resolver.get_calls(),
            vec![
                ResolverCall::Resolve {
                    target: "#step-1".to_string()
                },
                ResolverCall::Scroll {
                    target: "#step-1".to_string()
                },
            ]
        );
    }
}
