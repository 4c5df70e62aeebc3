//! Continuous train motion along segment paths.
//!
//! Each driving train advances a fixed distance per tick toward the
//! waypoint its cursor points at. Exactly one waypoint transition is
//! evaluated per tick; leftover distance after a snap is discarded, so a
//! run produces the same trajectory regardless of how pauses are
//! interleaved.

use bevy::prelude::*;

use crate::checkpoint::convert_checkpoint;
use crate::config::TICK_SECONDS;
use crate::direction::turn_sign;
use crate::events::{ChainExtended, CheckpointReached, TrainDestroyed};
use crate::fleet::{FleetSpeed, TrainKind};
use crate::grid::TrackGrid;
use crate::path::{SegmentPath, MIDPOINT, PATH_LEN};
use crate::run_flags::RunFlags;
use crate::segment::{SegmentId, SegmentStore};
use crate::simulation_sets::SimulationSet;

/// Marker for rail train entities.
#[derive(Component, Debug, Default)]
pub struct Train;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveState {
    /// Spawned but never started, or picked up off the track.
    #[default]
    Idle,
    Driving,
    /// Halted by pause or edit mode; resumes with cursor intact.
    Suspended,
    /// Ran off the end of its chain. Terminal.
    Terminated,
}

/// Segment the train currently occupies, if any.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct OnSegment(pub Option<SegmentId>);

/// Waypoint cursor into the occupied segment's path. `step` is chosen
/// once on entry from the segment's turn direction and stays fixed
/// while on the segment.
#[derive(Component, Debug, Clone, Copy)]
pub struct PathCursor {
    pub index: usize,
    pub step: i32,
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TrainPosition(pub Vec3);

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TrainFacing(pub Vec3);

/// Mutable view of one train's motion state, borrowed out of the ECS
/// for the duration of a step.
pub struct TrainMotion<'a> {
    pub state: &'a mut DriveState,
    pub segment: &'a mut OnSegment,
    pub cursor: &'a mut PathCursor,
    pub position: &'a mut TrainPosition,
    pub facing: &'a mut TrainFacing,
}

/// What a single tick of stepping did to a train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not on a segment; nothing to do.
    Holding,
    /// Moved along the current leg or advanced the cursor in-segment.
    Moving,
    /// The next segment is occupied; waiting at the exit edge.
    Blocked,
    /// The cursor landed on the midpoint of the final open checkpoint.
    CheckpointReached(SegmentId),
    /// Crossed the exit edge onto the next segment.
    AdvancedTo(SegmentId),
    /// No successor past the exit edge; the train terminated.
    EndOfTrack(SegmentId),
}

/// Advance one train by `distance` grid units. Pure with respect to the
/// ECS: everything it touches is passed in.
pub fn step_train(
    entity: Entity,
    motion: &mut TrainMotion,
    store: &mut SegmentStore,
    distance: f32,
) -> StepOutcome {
    let Some(seg_id) = motion.segment.0 else {
        return StepOutcome::Holding;
    };
    let path = match store.get(seg_id).and_then(SegmentPath::for_segment) {
        Some(path) => path,
        None => {
            // The track vanished or lost power under the train.
            warn!("train {entity} lost its segment {seg_id:?} mid-ride");
            motion.segment.0 = None;
            *motion.state = DriveState::Terminated;
            return StepOutcome::EndOfTrack(seg_id);
        }
    };

    let target = path.points[motion.cursor.index];
    let remaining = motion.position.0.distance(target);

    if remaining > distance {
        let leg_dir = (target - motion.position.0).normalize_or_zero();
        motion.position.0 += leg_dir * distance;
        // Blend toward the next leg's direction as the waypoint nears,
        // so facing never snaps on sharp bends.
        let next_dir = path.forward_at(motion.cursor.index, motion.cursor.step);
        let leg = path
            .leg_length(motion.cursor.index, motion.cursor.step)
            .max(f32::EPSILON);
        let t = (1.0 - (remaining - distance) / leg).clamp(0.0, 1.0);
        motion.facing.0 = leg_dir.lerp(next_dir, t).normalize_or_zero();
        return StepOutcome::Moving;
    }

    // Snap to the waypoint; residual distance is discarded.
    motion.position.0 = target;
    let next_index = motion.cursor.index as i32 + motion.cursor.step;

    let is_final_checkpoint = store.get(seg_id).is_some_and(|s| s.is_final_checkpoint());
    if next_index == MIDPOINT as i32 && is_final_checkpoint {
        motion.cursor.index = MIDPOINT;
        return StepOutcome::CheckpointReached(seg_id);
    }

    if (0..PATH_LEN as i32).contains(&next_index) {
        motion.cursor.index = next_index as usize;
        motion.facing.0 = path.forward_at(motion.cursor.index, motion.cursor.step);
        return StepOutcome::Moving;
    }

    // Past the exit edge: hand over to the successor, or terminate.
    let next_link = store.get(seg_id).and_then(|s| s.next);
    match next_link {
        Some(next_id) => {
            let Some(next_segment) = store.get(next_id) else {
                warn!("segment {seg_id:?} links to missing successor {next_id:?}");
                return StepOutcome::Blocked;
            };
            if next_segment.occupant.is_some() {
                return StepOutcome::Blocked;
            }
            let turn = turn_sign(next_segment.in_dir, next_segment.out_dir);
            if let Some(current) = store.get_mut(seg_id) {
                current.occupant = None;
            }
            if let Some(next_segment) = store.get_mut(next_id) {
                next_segment.occupant = Some(entity);
            }
            motion.segment.0 = Some(next_id);
            motion.cursor.index = SegmentPath::entry_index(turn);
            motion.cursor.step = SegmentPath::entry_step(turn);
            StepOutcome::AdvancedTo(next_id)
        }
        None => {
            if let Some(current) = store.get_mut(seg_id) {
                current.occupant = None;
            }
            motion.segment.0 = None;
            *motion.state = DriveState::Terminated;
            StepOutcome::EndOfTrack(seg_id)
        }
    }
}

/// Drive all trains one tick. The leader moves first; followers only
/// drive while the leader does, so the fleet suspends and resumes as a
/// unit.
pub fn drive_trains(
    flags: Res<RunFlags>,
    speed: Res<FleetSpeed>,
    grid: Res<TrackGrid>,
    mut store: ResMut<SegmentStore>,
    mut checkpoint_events: EventWriter<CheckpointReached>,
    mut destroyed_events: EventWriter<TrainDestroyed>,
    mut extended_events: EventWriter<ChainExtended>,
    mut trains: Query<
        (
            Entity,
            &TrainKind,
            &mut DriveState,
            &mut OnSegment,
            &mut PathCursor,
            &mut TrainPosition,
            &mut TrainFacing,
        ),
        With<Train>,
    >,
) {
    let distance = speed.cells_per_sec * TICK_SECONDS;
    let halted = flags.halted();

    // Pause and resume.
    for (_, _, mut state, _, _, _, _) in trains.iter_mut() {
        match *state {
            DriveState::Driving if halted => *state = DriveState::Suspended,
            DriveState::Suspended if !halted => *state = DriveState::Driving,
            _ => {}
        }
    }

    // Leader first.
    let mut leader_driving = false;
    for (entity, kind, mut state, mut segment, mut cursor, mut position, mut facing) in
        trains.iter_mut()
    {
        if *kind != TrainKind::Leader || *state != DriveState::Driving {
            continue;
        }
        let mut motion = TrainMotion {
            state: &mut state,
            segment: &mut segment,
            cursor: &mut cursor,
            position: &mut position,
            facing: &mut facing,
        };
        let outcome = step_train(entity, &mut motion, &mut store, distance);
        apply_outcome(
            outcome,
            entity,
            &mut store,
            &grid,
            &mut checkpoint_events,
            &mut destroyed_events,
            &mut extended_events,
        );
        leader_driving |= *state == DriveState::Driving;
    }

    // Followers ride only while the leader does.
    for (entity, kind, mut state, mut segment, mut cursor, mut position, mut facing) in
        trains.iter_mut()
    {
        if *kind != TrainKind::Follower {
            continue;
        }
        if !leader_driving {
            if *state == DriveState::Driving {
                *state = DriveState::Suspended;
            }
            continue;
        }
        if *state == DriveState::Suspended {
            *state = DriveState::Driving;
        }
        if *state != DriveState::Driving {
            continue;
        }
        let mut motion = TrainMotion {
            state: &mut state,
            segment: &mut segment,
            cursor: &mut cursor,
            position: &mut position,
            facing: &mut facing,
        };
        let outcome = step_train(entity, &mut motion, &mut store, distance);
        apply_outcome(
            outcome,
            entity,
            &mut store,
            &grid,
            &mut checkpoint_events,
            &mut destroyed_events,
            &mut extended_events,
        );
    }
}

fn apply_outcome(
    outcome: StepOutcome,
    entity: Entity,
    store: &mut SegmentStore,
    grid: &TrackGrid,
    checkpoint_events: &mut EventWriter<CheckpointReached>,
    destroyed_events: &mut EventWriter<TrainDestroyed>,
    extended_events: &mut EventWriter<ChainExtended>,
) {
    match outcome {
        StepOutcome::CheckpointReached(segment) => {
            checkpoint_events.send(CheckpointReached {
                segment,
                train: entity,
            });
            if let Some(ahead) = convert_checkpoint(store, grid, segment) {
                extended_events.send(ChainExtended { segment: ahead });
            }
        }
        StepOutcome::EndOfTrack(segment) => {
            destroyed_events.send(TrainDestroyed {
                train: entity,
                segment,
            });
        }
        _ => {}
    }
}

pub struct TraversalPlugin;

impl Plugin for TraversalPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, drive_trains.in_set(SimulationSet::Simulation));
    }
}
