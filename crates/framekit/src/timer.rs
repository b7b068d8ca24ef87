//! Tick-counted one-shot timers.
//!
//! Delayed actions such as "reveal the coin after three seconds" or "flip the
//! unmatched cards back" are scheduled here instead of on a wall clock. They
//! advance only when the session ticks, so they are deterministic and a reset
//! can cancel every one of them at once.
//!
//! ```
//! use framekit::timer::Timers;
//!
//! let mut timers = Timers::new();
//! timers.schedule(2, "reveal");
//! assert!(timers.tick().is_empty());
//! assert_eq!(timers.tick(), vec!["reveal"]);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Handle to a scheduled timer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Pending<T> {
    remaining: u32,
    payload: T,
}

/// A set of pending one-shot timers carrying payloads of type `T`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timers<T> {
    next_id: u64,
    pending: BTreeMap<TimerId, Pending<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> Timers<T> {
    /// Creates an empty timer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `payload` to fire after `ticks` ticks. A delay of zero fires
    /// on the next tick.
    pub fn schedule(&mut self, ticks: u32, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(
            id,
            Pending {
                remaining: ticks.max(1),
                payload,
            },
        );
        trace!(?id, ticks, "timer scheduled");
        id
    }

    /// Cancels a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Cancels every pending timer. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        if dropped > 0 {
            trace!(dropped, "timers cancelled");
        }
        dropped
    }

    /// Advances every timer by one tick and returns the payloads that fired,
    /// oldest first.
    pub fn tick(&mut self) -> Vec<T> {
        let mut due = Vec::new();
        for (id, timer) in &mut self.pending {
            timer.remaining -= 1;
            if timer.remaining == 0 {
                due.push(*id);
            }
        }
        due.into_iter()
            .filter_map(|id| self.pending.remove(&id))
            .map(|timer| timer.payload)
            .collect()
    }

    /// Returns `true` if the timer has not fired or been cancelled.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Ticks left before `id` fires.
    #[must_use]
    pub fn remaining(&self, id: TimerId) -> Option<u32> {
        self.pending.get(&id).map(|timer| timer.remaining)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
