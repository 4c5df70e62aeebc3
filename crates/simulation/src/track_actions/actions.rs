use serde::{Deserialize, Serialize};

use crate::direction::Cardinal;

/// Everything an external caller can do to the rail world. Coordinates
/// are `(x, z)` grid cells on the track plane.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TrackAction {
    /// Seed a new chain with a segment powered from creation.
    PlaceStart {
        pos: (i32, i32),
        dir: Cardinal,
    },
    /// Place an ordinary or checkpoint segment and connect it.
    PlaceSegment {
        pos: (i32, i32),
        checkpoint: bool,
    },
    /// Pick the segment at `pos` back up.
    RemoveSegment {
        pos: (i32, i32),
    },
    /// Drop the leader engine onto the segment at `pos`.
    SpawnLeader {
        pos: (i32, i32),
        tier: u8,
    },
    /// Drop a follower car onto the segment at `pos`.
    SpawnFollower {
        pos: (i32, i32),
        tier: u8,
    },
    /// Take every terminated, off-track train back into the hand.
    /// Requires edit mode.
    PickUpTrain,
    SetPaused {
        paused: bool,
    },
    SetEditMode {
        edit_mode: bool,
    },
    SetSpeed {
        cells_per_sec: f32,
    },
}
