//! Runtime invariant guards for the track graph and train occupancy.
//!
//! These systems run every slow-tick cycle (~100 ticks) and validate
//! that the chain structure hasn't become corrupted: link symmetry,
//! occupancy mutuality, and shape/direction agreement. On violation, a
//! warning is logged and the offending link or field is repaired.

use bevy::prelude::*;

use crate::direction::{facing_of, shape_of};
use crate::segment::{SegmentId, SegmentStore};
use crate::simulation_sets::SimulationSet;
use crate::traversal::{DriveState, OnSegment, Train};
use crate::SlowTickTimer;

/// Tracks the number of chain invariant violations detected during the
/// last validation pass. Used by integration tests.
#[derive(Resource, Default, Debug)]
pub struct ChainInvariantViolations {
    pub link_symmetry: u32,
    pub occupancy: u32,
    pub shape: u32,
}

// ---------------------------------------------------------------------------
// Link symmetry
// ---------------------------------------------------------------------------

/// Segments whose `next` does not point back via `prev`, or whose `prev`
/// does not point forward via `next`.
pub fn find_asymmetric_links(store: &SegmentStore) -> Vec<SegmentId> {
    let mut bad = Vec::new();
    for (id, segment) in store.iter() {
        let next_ok = segment
            .next
            .is_none_or(|n| store.get(n).is_some_and(|s| s.prev == Some(id)));
        let prev_ok = segment
            .prev
            .is_none_or(|p| store.get(p).is_some_and(|s| s.next == Some(id)));
        if !next_ok || !prev_ok {
            bad.push(id);
        }
    }
    bad
}

/// Validate that every chain link is mutual; asymmetric links are
/// severed on the side that holds them.
pub fn validate_chain_links(
    slow_tick: Res<SlowTickTimer>,
    mut store: ResMut<SegmentStore>,
    mut violations: ResMut<ChainInvariantViolations>,
) {
    if !slow_tick.should_run() {
        return;
    }
    violations.link_symmetry = 0;

    for id in find_asymmetric_links(&store) {
        let (next, prev) = match store.get(id) {
            Some(s) => (s.next, s.prev),
            None => continue,
        };
        if let Some(n) = next {
            if !store.get(n).is_some_and(|s| s.prev == Some(id)) {
                warn!("Invariant violation: {id:?} -> {n:?} link is one-sided. Severing.");
                if let Some(segment) = store.get_mut(id) {
                    segment.next = None;
                }
                violations.link_symmetry += 1;
            }
        }
        if let Some(p) = prev {
            if !store.get(p).is_some_and(|s| s.next == Some(id)) {
                warn!("Invariant violation: {p:?} -> {id:?} link is one-sided. Severing.");
                if let Some(segment) = store.get_mut(id) {
                    segment.prev = None;
                }
                violations.link_symmetry += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Occupancy mutuality
// ---------------------------------------------------------------------------

/// Validate that segment occupancy and train placement agree both ways.
/// A segment claiming an absent rider is vacated; a train riding a
/// segment that doesn't claim it is terminated.
pub fn validate_occupancy(
    slow_tick: Res<SlowTickTimer>,
    mut store: ResMut<SegmentStore>,
    mut trains: Query<(Entity, &mut OnSegment, &mut DriveState), With<Train>>,
    mut violations: ResMut<ChainInvariantViolations>,
) {
    if !slow_tick.should_run() {
        return;
    }
    violations.occupancy = 0;

    let riders: Vec<(Entity, SegmentId)> = trains
        .iter()
        .filter_map(|(entity, segment, _)| segment.0.map(|id| (entity, id)))
        .collect();

    for id in store.ids() {
        let Some(occupant) = store.get(id).and_then(|s| s.occupant) else {
            continue;
        };
        if !riders.contains(&(occupant, id)) {
            warn!("Invariant violation: {id:?} claims occupant {occupant} that is not riding it. Vacating.");
            if let Some(segment) = store.get_mut(id) {
                segment.occupant = None;
            }
            violations.occupancy += 1;
        }
    }

    for (entity, mut segment, mut state) in trains.iter_mut() {
        let Some(id) = segment.0 else { continue };
        if store.get(id).is_some_and(|s| s.occupant == Some(entity)) {
            continue;
        }
        warn!("Invariant violation: train {entity} rides {id:?} without holding occupancy. Terminating.");
        segment.0 = None;
        *state = DriveState::Terminated;
        violations.occupancy += 1;
    }
}

// ---------------------------------------------------------------------------
// Shape agreement
// ---------------------------------------------------------------------------

/// Powered segments whose stored shape or facing disagrees with their
/// direction pair.
pub fn find_shape_mismatches(store: &SegmentStore) -> Vec<SegmentId> {
    store
        .iter()
        .filter(|(_, s)| {
            s.is_powered()
                && (s.shape != shape_of(s.in_dir, s.out_dir)
                    || s.facing != facing_of(s.in_dir, s.out_dir))
        })
        .map(|(id, _)| id)
        .collect()
}

/// Validate that derived shape fields match the direction pair,
/// recomputing them where they drifted.
pub fn validate_shapes(
    slow_tick: Res<SlowTickTimer>,
    mut store: ResMut<SegmentStore>,
    mut violations: ResMut<ChainInvariantViolations>,
) {
    if !slow_tick.should_run() {
        return;
    }
    violations.shape = 0;

    for id in find_shape_mismatches(&store) {
        warn!("Invariant violation: {id:?} shape/facing out of sync with directions. Recomputing.");
        if let Some(segment) = store.get_mut(id) {
            let (in_dir, out_dir) = (segment.in_dir, segment.out_dir);
            segment.set_directions(in_dir, out_dir);
        }
        violations.shape += 1;
    }
}

pub struct InvariantChecksPlugin;

impl Plugin for InvariantChecksPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChainInvariantViolations>().add_systems(
            FixedUpdate,
            (validate_chain_links, validate_occupancy, validate_shapes)
                .in_set(SimulationSet::PostSim),
        );
    }
}
