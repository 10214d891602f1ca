//! Store buffer: holds in-flight stores for store-to-load forwarding.
//!
//! An entry is created the cycle a STORE's LSU-pipe occupant reaches stage 1
//! and removed at the start of the retire stage of the cycle *after* the
//! store retires — the one-cycle delay is tracked by the caller (the core's
//! retire stage), not by this structure, since it depends on retirement
//! counting that spans the whole ROB, not just this buffer.

use std::collections::VecDeque;

/// A single store buffer entry: just enough to answer forwarding queries.
#[derive(Debug, Clone, Copy)]
pub struct StoreBufferEntry {
    /// Dynamic id of the store instruction.
    pub dyn_id: u64,
    /// Effective address the store writes.
    pub addr: u64,
}

/// FIFO queue of in-flight stores, capacity-bounded by the ROB size (which
/// the invariants guarantee is never exceeded).
pub struct StoreBuffer {
    entries: VecDeque<StoreBufferEntry>,
}

impl StoreBuffer {
    /// Builds an empty store buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Number of entries currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the buffer holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a store entering the LSU pipe.
    pub fn push(&mut self, dyn_id: u64, addr: u64) {
        self.entries.push_back(StoreBufferEntry { dyn_id, addr });
    }

    /// Removes up to `count` entries from the front (oldest first).
    pub fn pop_front_n(&mut self, count: usize) {
        for _ in 0..count {
            if self.entries.pop_front().is_none() {
                break;
            }
        }
    }

    /// True if any buffered store targets `addr` (a store-to-load forward hit).
    #[must_use]
    pub fn has_matching_address(&self, addr: u64) -> bool {
        self.entries.iter().any(|entry| entry.addr == addr)
    }
}

impl Default for StoreBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_on_matching_address() {
        let mut sb = StoreBuffer::new();
        sb.push(0, 0x100);
        assert!(sb.has_matching_address(0x100));
        assert!(!sb.has_matching_address(0x104));
    }

    #[test]
    fn pop_front_n_removes_oldest_first() {
        let mut sb = StoreBuffer::new();
        sb.push(0, 0x100);
        sb.push(1, 0x200);
        sb.push(2, 0x300);
        sb.pop_front_n(2);
        assert_eq!(sb.len(), 1);
        assert!(sb.has_matching_address(0x300));
        assert!(!sb.has_matching_address(0x100));
    }

    #[test]
    fn pop_front_n_stops_at_empty() {
        let mut sb = StoreBuffer::new();
        sb.push(0, 0x100);
        sb.pop_front_n(5);
        assert!(sb.is_empty());
    }
}
