use std::collections::BTreeMap;

use crate::clock::Timestamp;

/// Handle of a pending deferred callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Cancellable deferral of work to a later point on the event loop
pub trait Scheduler {
    fn schedule(&mut self, now: Timestamp, delay_ms: u64) -> TimerId;
    /// Returns true if the timer was still pending
    fn cancel(&mut self, id: TimerId) -> bool;
}

/// Deadline-ordered timers fired by the runner between events
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: BTreeMap<TimerId, Timestamp>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.pending.values().min().copied()
    }

    /// Remove and return every timer due at `now`, earliest deadline first
    pub fn take_due(&mut self, now: Timestamp) -> Vec<TimerId> {
        let mut due: Vec<(Timestamp, TimerId)> = self
            .pending
            .iter()
            .filter(|(_, &deadline)| deadline <= now)
            .map(|(&id, &deadline)| (deadline, id))
            .collect();
        due.sort();

        for (_, id) in &due {
            self.pending.remove(id);
        }

        due.into_iter().map(|(_, id)| id).collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, now: Timestamp, delay_ms: u64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, now.saturating_add(delay_ms));
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }
}
