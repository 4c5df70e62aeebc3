use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::TrackAction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedAction {
    /// Tick the action was submitted on (not the tick it executes on).
    pub tick: u64,
    pub action: TrackAction,
}

/// FIFO of actions waiting for the next executor pass.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionQueue {
    pending: Vec<QueuedAction>,
}

impl ActionQueue {
    pub fn push(&mut self, tick: u64, action: TrackAction) {
        self.pending.push(QueuedAction { tick, action });
    }

    pub fn drain(&mut self) -> Vec<QueuedAction> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
