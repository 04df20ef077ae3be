// Settle timer - one cancellable pending TOOLTIP transition, keyed by run + step

use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTicket {
    pub run_id: Uuid,
    pub index: usize,
    pub due: Instant,
}

impl SettleTicket {
    pub fn matches(&self, run_id: Uuid, index: usize) -> bool {
        self.run_id == run_id && self.index == index
    }
}

#[derive(Debug, Default)]
pub struct SettleTimer {
    pending: Option<SettleTicket>,
}

impl SettleTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was pending with a new ticket.
    pub fn schedule(&mut self, run_id: Uuid, index: usize, delay: Duration, now: Instant) {
        if let Some(stale) = self.pending.take() {
            tracing::debug!(run_id = %stale.run_id, index = stale.index, "Superseded settle timer");
        }
        self.pending = Some(SettleTicket {
            run_id,
            index,
            due: now + delay,
        });
    }

    pub fn cancel(&mut self) -> Option<SettleTicket> {
        let cancelled = self.pending.take();
        if let Some(ticket) = &cancelled {
            tracing::debug!(run_id = %ticket.run_id, index = ticket.index, "Cancelled settle timer");
        }
        cancelled
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|ticket| ticket.due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending ticket if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<SettleTicket> {
        match self.pending {
            Some(ticket) if ticket.due <= now => self.pending.take(),
            _ => None,
        }
    }
}
