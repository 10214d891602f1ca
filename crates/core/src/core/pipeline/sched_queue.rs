//! The unified scheduling queue: the union of reservation stations for all
//! functional-unit types, ordered by dispatch order.
//!
//! An entry leaves the queue the instant it completes in execute, so every
//! entry still present here is, by construction, not yet completed — the
//! memory-disambiguation scan in the schedule stage can treat "present in
//! the queue" and "not yet completed" as the same condition.

use std::collections::VecDeque;

use crate::core::pipeline::entry::PipelineEntry;

/// Reservation-station queue shared by every functional-unit type.
pub struct SchedQueue {
    entries: VecDeque<PipelineEntry>,
    capacity: usize,
}

impl SchedQueue {
    /// Builds an empty queue with capacity `S * (A + M + L)`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current occupancy.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the queue holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the queue cannot accept another entry.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Appends a newly dispatched entry at the tail. Returns `false` if full.
    pub fn push(&mut self, entry: PipelineEntry) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries.push_back(entry);
        true
    }

    /// Iterates entries in program order, read-only.
    pub fn iter(&self) -> impl Iterator<Item = &PipelineEntry> {
        self.entries.iter()
    }

    /// Removes the entry with the given dynamic id (execute-completion
    /// removal). Absence means execute completed an entry the scheduling
    /// queue never admitted, which is a bug upstream of this call.
    pub fn remove(&mut self, dyn_id: u64) {
        let pos = self.entries.iter().position(|e| e.dyn_id() == dyn_id);
        debug_assert!(pos.is_some(), "completed entry {dyn_id} not in sched queue");
        if let Some(pos) = pos {
            let _ = self.entries.remove(pos);
        }
    }

    /// Marks the entry with the given dynamic id as fired, so the schedule
    /// stage does not re-select it on a later pass while it awaits
    /// completion. Absence means schedule fired an entry it never admitted,
    /// which is a bug upstream of this call.
    pub fn set_fired(&mut self, dyn_id: u64) {
        let found = self.entries.iter_mut().find(|e| e.dyn_id() == dyn_id);
        debug_assert!(found.is_some(), "fired entry {dyn_id} not in sched queue");
        if let Some(entry) = found {
            entry.fired = true;
        }
    }
}
