//! Ring-buffer log of recently executed track actions and their outcomes.
//!
//! The [`ActionOutcomeLog`] resource stores the last 64
//! `(TrackAction, ActionOutcome)` pairs, giving callers a way to inspect
//! what happened without polling the ECS every tick.

use bevy::prelude::*;

use super::{ActionOutcome, TrackAction};

/// Maximum number of entries retained in the ring buffer.
const MAX_ENTRIES: usize = 64;

#[derive(Resource, Debug, Clone, Default)]
pub struct ActionOutcomeLog {
    entries: Vec<(TrackAction, ActionOutcome)>,
}

impl ActionOutcomeLog {
    /// Record a new action/outcome pair. If the buffer is full the
    /// oldest entry is evicted.
    pub fn push(&mut self, action: TrackAction, outcome: ActionOutcome) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push((action, outcome));
    }

    /// Return the last `n` entries (or fewer if the log is shorter).
    pub fn last_n(&self, n: usize) -> &[(TrackAction, ActionOutcome)] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
