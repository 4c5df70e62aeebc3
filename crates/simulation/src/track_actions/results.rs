use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    Error(ActionError),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionError {
    OutOfBounds,
    /// The target cell holds a segment that cannot be replaced.
    CellLocked,
    NotFound,
    /// Seed segments are never removable.
    StartsPowered,
    /// A train is riding the segment.
    Occupied,
    /// Open checkpoints cannot be picked up.
    OpenCheckpoint,
    /// Ridden segments stay locked down.
    RideLocked,
    /// Trains spawn only on powered segments.
    NotPowered,
    /// At most one leader engine exists at a time.
    LeaderExists,
    /// Picking up trains only works in edit mode.
    EditModeRequired,
    InvalidParameter(String),
}
