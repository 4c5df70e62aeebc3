//! Fleet composition and shared speed.
//!
//! One leader engine is driven by the global speed; follower cars read
//! the same value and only move while the leader does. Checkpoint
//! passes raise the shared speed.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{CHECKPOINT_SPEED_BONUS, DEFAULT_FLEET_SPEED};
use crate::direction::turn_sign;
use crate::events::CheckpointReached;
use crate::path::{SegmentPath, MIDPOINT};
use crate::run_flags::RunFlags;
use crate::segment::{SegmentId, SegmentStore};
use crate::simulation_sets::SimulationSet;
use crate::traversal::{
    drive_trains, DriveState, OnSegment, PathCursor, Train, TrainFacing, TrainPosition,
};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainKind {
    /// Driven directly by the fleet speed. At most one per world.
    Leader,
    /// Trails the leader; suspends whenever the leader is not driving.
    Follower,
}

/// Cosmetic tier of a car or engine.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainTier(pub u8);

/// Shared fleet speed in grid cells per second.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FleetSpeed {
    pub cells_per_sec: f32,
}

impl Default for FleetSpeed {
    fn default() -> Self {
        Self {
            cells_per_sec: DEFAULT_FLEET_SPEED,
        }
    }
}

#[derive(Bundle)]
pub struct TrainBundle {
    pub train: Train,
    pub kind: TrainKind,
    pub tier: TrainTier,
    pub state: DriveState,
    pub segment: OnSegment,
    pub cursor: PathCursor,
    pub position: TrainPosition,
    pub facing: TrainFacing,
}

/// Build the component bundle for a train dropped onto a segment. The
/// segment must be powered and unoccupied; the caller is responsible
/// for recording the occupancy once the entity id exists.
pub fn make_train(
    store: &SegmentStore,
    id: SegmentId,
    kind: TrainKind,
    tier: u8,
) -> Option<TrainBundle> {
    let segment = store.get(id)?;
    if segment.occupant.is_some() {
        return None;
    }
    let path = SegmentPath::for_segment(segment)?;
    let turn = turn_sign(segment.in_dir, segment.out_dir);
    let step = SegmentPath::entry_step(turn);
    Some(TrainBundle {
        train: Train,
        kind,
        tier: TrainTier(tier),
        state: DriveState::Driving,
        segment: OnSegment(Some(id)),
        cursor: PathCursor {
            index: MIDPOINT,
            step,
        },
        position: TrainPosition(path.points[MIDPOINT]),
        facing: TrainFacing(path.forward_at(MIDPOINT, step)),
    })
}

/// Take a terminated train back into the player's hand. Only allowed in
/// edit mode, and only once the train is off the track.
pub fn pick_up_train(flags: &RunFlags, state: &mut DriveState, segment: &OnSegment) -> bool {
    if !flags.edit_mode || segment.0.is_some() || *state != DriveState::Terminated {
        return false;
    }
    *state = DriveState::Idle;
    true
}

/// Each checkpoint pass permanently raises the shared fleet speed.
pub fn speed_on_checkpoint(
    mut speed: ResMut<FleetSpeed>,
    mut checkpoints: EventReader<CheckpointReached>,
) {
    for _ in checkpoints.read() {
        speed.cells_per_sec += CHECKPOINT_SPEED_BONUS;
    }
}

pub struct FleetPlugin;

impl Plugin for FleetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FleetSpeed>().add_systems(
            FixedUpdate,
            speed_on_checkpoint
                .in_set(SimulationSet::Simulation)
                .after(drive_trains),
        );
    }
}
