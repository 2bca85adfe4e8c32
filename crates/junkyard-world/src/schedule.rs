//! Deferred one-shot actions on the tick timeline.
//!
//! Actions are queued with a delay in ticks and drained once per tick, in
//! fire order. There is no cancellation; actions must tolerate targets that
//! are already gone.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use junkyard_common::ObjectHandle;

/// Deferred world mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Remove an object from the physics backend (no-op if already gone)
    RemoveObject(ObjectHandle),
}

/// A queued action.
#[derive(Debug)]
struct Entry<A> {
    fire_at: u64,
    seq: u64,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Entry<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, earliest entry must surface first.
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of `(fire_at_tick, action)` pairs.
#[derive(Debug)]
pub struct DeferredQueue<A> {
    /// Pending entries
    heap: BinaryHeap<Entry<A>>,
    /// Insertion counter, breaks ties
    next_seq: u64,
    /// Latest tick passed to `drain_due`
    now: u64,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> DeferredQueue<A> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            now: 0,
        }
    }

    /// Queues `action` to fire `delay` ticks after the last drained tick.
    pub fn schedule(&mut self, delay: u64, action: A) {
        self.schedule_at(self.now.saturating_add(delay), action);
    }

    /// Queues `action` to fire at tick `fire_at`.
    pub fn schedule_at(&mut self, fire_at: u64, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            fire_at,
            seq,
            action,
        });
    }

    /// Pops every action due at or before `now`, earliest first; ties keep
    /// insertion order.
    pub fn drain_due(&mut self, now: u64) -> Vec<A> {
        self.now = self.now.max(now);
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|e| e.fire_at <= now) {
            if let Some(entry) = self.heap.pop() {
                due.push(entry.action);
            }
        }
        due
    }

    /// Tick of the earliest pending action.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.fire_at)
    }

    /// Number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
