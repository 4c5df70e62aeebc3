//! Incremental chain maintenance for the rail network.
//!
//! Placement connects a new segment to at most one upstream neighbor,
//! chosen by a fixed scan order, so the network is always a set of
//! simple directed chains. Pickup severs links at the removal point and
//! never cascades past the immediate neighbors.

use bevy::prelude::*;

use crate::direction::Cardinal;
use crate::grid::TrackGrid;
use crate::segment::{RailSegment, SegmentId, SegmentStore};

/// Result of wiring a freshly placed segment into the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// An upstream candidate linked the new segment into its chain.
    Linked { from: SegmentId },
    /// The candidate was an open checkpoint: the direction pair was
    /// propagated through it but no link was committed, so the chain
    /// still terminates at the checkpoint.
    Forwarded { checkpoint: SegmentId },
    /// No eligible neighbor; the segment sits unpowered.
    Isolated,
}

/// Why a pickup request was refused. Checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupDenied {
    Missing,
    StartsPowered,
    Occupied,
    OpenCheckpoint,
    RideLocked,
}

/// Seed a new network: a segment powered from creation with a straight
/// direction pair. Fails on an out-of-bounds or occupied cell.
pub fn place_start(
    store: &mut SegmentStore,
    grid: &mut TrackGrid,
    pos: IVec3,
    dir: Cardinal,
) -> Option<SegmentId> {
    if !grid.in_bounds(pos) || grid.segment_at(pos).is_some() {
        return None;
    }
    let mut segment = RailSegment::new(pos);
    segment.set_directions(dir.offset(), dir.offset());
    segment.starts_powered = true;
    let id = store.insert(segment);
    grid.place(pos, id);
    Some(id)
}

/// Place an ordinary or checkpoint segment and wire it to the network.
/// A pickable segment already in the cell is replaced; a cell holding a
/// locked segment refuses the placement.
pub fn place_segment(
    store: &mut SegmentStore,
    grid: &mut TrackGrid,
    pos: IVec3,
    checkpoint: bool,
) -> Option<(SegmentId, ConnectOutcome)> {
    if !grid.in_bounds(pos) {
        return None;
    }
    if grid.segment_at(pos).is_some() && remove_segment(store, grid, pos).is_err() {
        return None;
    }
    let mut segment = RailSegment::new(pos);
    segment.is_checkpoint = checkpoint;
    let id = store.insert(segment);
    grid.place(pos, id);
    let outcome = connect(store, grid, id);
    Some((id, outcome))
}

/// Scan the four neighbor cells for a connection candidate and link the
/// new segment to the first eligible one.
///
/// A candidate must be powered, must not already have an outgoing link,
/// and must either be unoccupied or already flow toward the new cell
/// (never reverse a segment under a moving train).
fn connect(store: &mut SegmentStore, grid: &TrackGrid, new_id: SegmentId) -> ConnectOutcome {
    let pos = match store.get(new_id) {
        Some(s) => s.position,
        None => return ConnectOutcome::Isolated,
    };

    for dir in Cardinal::SCAN_ORDER {
        let neighbor_pos = pos + dir.offset();
        let Some(candidate_id) = grid.segment_at(neighbor_pos) else {
            continue;
        };
        // Direction the candidate must flow to reach the new cell.
        let link_dir = -dir.offset();
        let (in_dir, is_checkpoint) = match store.get(candidate_id) {
            Some(c)
                if c.is_powered()
                    && c.next.is_none()
                    && (c.occupant.is_none() || c.out_dir == link_dir) =>
            {
                (c.in_dir, c.is_checkpoint)
            }
            _ => continue,
        };

        if let Some(candidate) = store.get_mut(candidate_id) {
            candidate.set_directions(in_dir, link_dir);
        }
        if let Some(new_segment) = store.get_mut(new_id) {
            new_segment.set_directions(link_dir, link_dir);
        }

        if is_checkpoint {
            // The checkpoint forwards the direction pair through itself
            // but keeps terminating the chain until it is ridden.
            mark_ridden_upstream(store, candidate_id);
            return ConnectOutcome::Forwarded {
                checkpoint: candidate_id,
            };
        }

        if let Some(candidate) = store.get_mut(candidate_id) {
            candidate.next = Some(new_id);
        }
        if let Some(new_segment) = store.get_mut(new_id) {
            new_segment.prev = Some(candidate_id);
        }
        return ConnectOutcome::Linked { from: candidate_id };
    }

    ConnectOutcome::Isolated
}

/// Walk backward from a forwarding checkpoint and credit the segments
/// between it and the nearest occupied segment as ridden, so a train
/// already behind the checkpoint keeps its pickup locks consistent with
/// the shortcut that just opened ahead. No-op when nothing upstream is
/// occupied.
fn mark_ridden_upstream(store: &mut SegmentStore, from: SegmentId) {
    let mut pending = Vec::new();
    let mut cursor = Some(from);
    let mut found_occupied = false;
    while let Some(id) = cursor {
        let Some(segment) = store.get(id) else { break };
        if segment.occupant.is_some() {
            found_occupied = true;
            break;
        }
        pending.push(id);
        cursor = segment.prev;
    }
    if !found_occupied {
        return;
    }
    for id in pending {
        if let Some(segment) = store.get_mut(id) {
            segment.has_been_ridden = true;
        }
    }
}

/// Pick up the segment at `pos`, splitting its chain at the removal
/// point. Neighbors lose only the link that pointed at the removed
/// segment; a neighbor left with no links at all reverts to unpowered
/// unless it is a seed segment.
pub fn remove_segment(
    store: &mut SegmentStore,
    grid: &mut TrackGrid,
    pos: IVec3,
) -> Result<SegmentId, PickupDenied> {
    let Some(id) = grid.segment_at(pos) else {
        return Err(PickupDenied::Missing);
    };
    let Some(segment) = store.get(id) else {
        return Err(PickupDenied::Missing);
    };
    if segment.starts_powered {
        return Err(PickupDenied::StartsPowered);
    }
    if segment.occupant.is_some() {
        return Err(PickupDenied::Occupied);
    }
    if segment.is_checkpoint {
        return Err(PickupDenied::OpenCheckpoint);
    }
    if segment.has_been_ridden {
        return Err(PickupDenied::RideLocked);
    }

    let (prev, next) = (segment.prev, segment.next);
    if let Some(next_id) = next {
        if let Some(neighbor) = store.get_mut(next_id) {
            neighbor.prev = None;
            if neighbor.next.is_none() && !neighbor.starts_powered {
                neighbor.clear_power();
            }
        }
    }
    if let Some(prev_id) = prev {
        if let Some(neighbor) = store.get_mut(prev_id) {
            neighbor.next = None;
            if neighbor.prev.is_none() && !neighbor.starts_powered {
                neighbor.clear_power();
            }
        }
    }

    store.remove(id);
    grid.clear(pos);
    Ok(id)
}
