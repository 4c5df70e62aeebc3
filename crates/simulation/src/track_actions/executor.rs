//! Action executor system — drains the [`ActionQueue`] each fixed-update
//! tick and applies every queued [`TrackAction`] to the world, recording
//! outcomes in the [`ActionOutcomeLog`].
//!
//! Each action variant has a dedicated execution function that validates
//! inputs, mutates the track/fleet state, and returns an
//! [`ActionOutcome`].

use bevy::prelude::*;

use crate::config::TRACK_PLANE_Y;
use crate::connectivity::{place_segment, place_start, remove_segment, ConnectOutcome, PickupDenied};
use crate::direction::Cardinal;
use crate::events::ChainExtended;
use crate::fleet::{make_train, pick_up_train, FleetSpeed, TrainKind};
use crate::grid::TrackGrid;
use crate::run_flags::RunFlags;
use crate::segment::SegmentStore;
use crate::traversal::{DriveState, OnSegment, Train};

use super::result_log::ActionOutcomeLog;
use super::{ActionError, ActionOutcome, ActionQueue, TrackAction};

fn to_cell(pos: (i32, i32)) -> IVec3 {
    IVec3::new(pos.0, TRACK_PLANE_Y, pos.1)
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Drains all pending actions from the queue and executes them in order.
#[allow(clippy::too_many_arguments)]
pub fn execute_queued_actions(
    mut commands: Commands,
    mut queue: ResMut<ActionQueue>,
    mut log: ResMut<ActionOutcomeLog>,
    mut store: ResMut<SegmentStore>,
    mut grid: ResMut<TrackGrid>,
    mut flags: ResMut<RunFlags>,
    mut speed: ResMut<FleetSpeed>,
    mut extended: EventWriter<ChainExtended>,
    mut trains: Query<(&TrainKind, &mut DriveState, &OnSegment), With<Train>>,
) {
    // Leaders spawned by earlier actions this tick are not yet visible
    // to the query; track them locally so a double SpawnLeader in one
    // batch still fails.
    let mut leader_present = trains.iter().any(|(k, _, _)| *k == TrainKind::Leader);

    for queued in queue.drain() {
        let outcome = execute_single(
            &queued.action,
            &mut commands,
            &mut store,
            &mut grid,
            &mut flags,
            &mut speed,
            &mut extended,
            &mut trains,
            &mut leader_present,
        );
        log.push(queued.action, outcome);
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn execute_single(
    action: &TrackAction,
    commands: &mut Commands,
    store: &mut SegmentStore,
    grid: &mut TrackGrid,
    flags: &mut RunFlags,
    speed: &mut FleetSpeed,
    extended: &mut EventWriter<ChainExtended>,
    trains: &mut Query<(&TrainKind, &mut DriveState, &OnSegment), With<Train>>,
    leader_present: &mut bool,
) -> ActionOutcome {
    match action {
        TrackAction::PlaceStart { pos, dir } => execute_place_start(*pos, *dir, store, grid),
        TrackAction::PlaceSegment { pos, checkpoint } => {
            execute_place_segment(*pos, *checkpoint, store, grid, extended)
        }
        TrackAction::RemoveSegment { pos } => execute_remove_segment(*pos, store, grid),
        TrackAction::SpawnLeader { pos, tier } => {
            if *leader_present {
                return ActionOutcome::Error(ActionError::LeaderExists);
            }
            let outcome =
                execute_spawn_train(*pos, *tier, TrainKind::Leader, commands, store, grid);
            if outcome.is_success() {
                *leader_present = true;
            }
            outcome
        }
        TrackAction::SpawnFollower { pos, tier } => {
            execute_spawn_train(*pos, *tier, TrainKind::Follower, commands, store, grid)
        }
        TrackAction::PickUpTrain => execute_pick_up_trains(flags, trains),
        TrackAction::SetPaused { paused } => {
            flags.paused = *paused;
            ActionOutcome::Success
        }
        TrackAction::SetEditMode { edit_mode } => {
            flags.edit_mode = *edit_mode;
            ActionOutcome::Success
        }
        TrackAction::SetSpeed { cells_per_sec } => {
            if !cells_per_sec.is_finite() || *cells_per_sec <= 0.0 {
                return ActionOutcome::Error(ActionError::InvalidParameter(format!(
                    "speed must be positive, got {cells_per_sec}"
                )));
            }
            speed.cells_per_sec = *cells_per_sec;
            ActionOutcome::Success
        }
    }
}

// ---------------------------------------------------------------------------
// Execution functions
// ---------------------------------------------------------------------------

fn execute_place_start(
    pos: (i32, i32),
    dir: Cardinal,
    store: &mut SegmentStore,
    grid: &mut TrackGrid,
) -> ActionOutcome {
    let cell = to_cell(pos);
    if !grid.in_bounds(cell) {
        return ActionOutcome::Error(ActionError::OutOfBounds);
    }
    match place_start(store, grid, cell, dir) {
        Some(_) => ActionOutcome::Success,
        None => ActionOutcome::Error(ActionError::CellLocked),
    }
}

fn execute_place_segment(
    pos: (i32, i32),
    checkpoint: bool,
    store: &mut SegmentStore,
    grid: &mut TrackGrid,
    extended: &mut EventWriter<ChainExtended>,
) -> ActionOutcome {
    let cell = to_cell(pos);
    if !grid.in_bounds(cell) {
        return ActionOutcome::Error(ActionError::OutOfBounds);
    }
    match place_segment(store, grid, cell, checkpoint) {
        Some((id, ConnectOutcome::Linked { .. })) => {
            extended.send(ChainExtended { segment: id });
            ActionOutcome::Success
        }
        Some(_) => ActionOutcome::Success,
        None => ActionOutcome::Error(ActionError::CellLocked),
    }
}

fn execute_remove_segment(
    pos: (i32, i32),
    store: &mut SegmentStore,
    grid: &mut TrackGrid,
) -> ActionOutcome {
    let cell = to_cell(pos);
    if !grid.in_bounds(cell) {
        return ActionOutcome::Error(ActionError::OutOfBounds);
    }
    match remove_segment(store, grid, cell) {
        Ok(_) => ActionOutcome::Success,
        Err(PickupDenied::Missing) => ActionOutcome::Error(ActionError::NotFound),
        Err(PickupDenied::StartsPowered) => ActionOutcome::Error(ActionError::StartsPowered),
        Err(PickupDenied::Occupied) => ActionOutcome::Error(ActionError::Occupied),
        Err(PickupDenied::OpenCheckpoint) => ActionOutcome::Error(ActionError::OpenCheckpoint),
        Err(PickupDenied::RideLocked) => ActionOutcome::Error(ActionError::RideLocked),
    }
}

fn execute_pick_up_trains(
    flags: &RunFlags,
    trains: &mut Query<(&TrainKind, &mut DriveState, &OnSegment), With<Train>>,
) -> ActionOutcome {
    if !flags.edit_mode {
        return ActionOutcome::Error(ActionError::EditModeRequired);
    }
    let mut picked = 0u32;
    for (_, mut state, segment) in trains.iter_mut() {
        if pick_up_train(flags, &mut state, segment) {
            picked += 1;
        }
    }
    if picked > 0 {
        ActionOutcome::Success
    } else {
        ActionOutcome::Error(ActionError::NotFound)
    }
}

fn execute_spawn_train(
    pos: (i32, i32),
    tier: u8,
    kind: TrainKind,
    commands: &mut Commands,
    store: &mut SegmentStore,
    grid: &TrackGrid,
) -> ActionOutcome {
    let cell = to_cell(pos);
    if !grid.in_bounds(cell) {
        return ActionOutcome::Error(ActionError::OutOfBounds);
    }
    let Some(id) = grid.segment_at(cell) else {
        return ActionOutcome::Error(ActionError::NotFound);
    };
    let Some(segment) = store.get(id) else {
        return ActionOutcome::Error(ActionError::NotFound);
    };
    if segment.occupant.is_some() {
        return ActionOutcome::Error(ActionError::Occupied);
    }
    if !segment.is_powered() {
        return ActionOutcome::Error(ActionError::NotPowered);
    }
    let Some(bundle) = make_train(store, id, kind, tier) else {
        return ActionOutcome::Error(ActionError::NotPowered);
    };
    let entity = commands.spawn(bundle).id();
    if let Some(segment) = store.get_mut(id) {
        segment.occupant = Some(entity);
    }
    ActionOutcome::Success
}
