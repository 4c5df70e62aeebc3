//! Checkpoint conversion.
//!
//! A checkpoint terminates its chain until a train passes its path
//! midpoint. Conversion turns it into an ordinary ridden segment and, if
//! a forwarded segment is already waiting in the cell ahead, closes the
//! gap the forwarding left open.

use crate::grid::TrackGrid;
use crate::segment::{SegmentId, SegmentStore};

/// Convert a checkpoint that a train has just ridden through. Returns
/// the segment the chain was extended onto, if the forwarded segment
/// ahead could be reattached.
pub fn convert_checkpoint(
    store: &mut SegmentStore,
    grid: &TrackGrid,
    id: SegmentId,
) -> Option<SegmentId> {
    let (pos, out_dir, had_next) = {
        let segment = store.get_mut(id)?;
        if !segment.is_checkpoint {
            return None;
        }
        segment.is_checkpoint = false;
        segment.has_been_ridden = true;
        (segment.position, segment.out_dir, segment.next.is_some())
    };
    if had_next {
        return None;
    }

    // A forwarded segment sits ahead exactly when connectivity routed a
    // placement through this checkpoint: powered, chain-headless, and
    // flowing the same way we exit.
    let ahead_id = grid.segment_at(pos + out_dir)?;
    let ahead_ok = store
        .get(ahead_id)
        .is_some_and(|a| a.is_powered() && a.prev.is_none() && a.in_dir == out_dir);
    if !ahead_ok {
        return None;
    }

    if let Some(segment) = store.get_mut(id) {
        segment.next = Some(ahead_id);
    }
    if let Some(ahead) = store.get_mut(ahead_id) {
        ahead.prev = Some(id);
    }
    Some(ahead_id)
}
