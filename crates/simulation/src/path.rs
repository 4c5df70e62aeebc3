//! Local traversal paths through a segment.
//!
//! Every powered segment carries a fixed, odd-length polyline of world
//! space waypoints: straight segments subdivide the through-line, bent
//! segments sample a quarter arc of radius half a cell. The odd length
//! guarantees a well-defined midpoint waypoint, which is what checkpoint
//! triggering keys on.
//!
//! Waypoints are stored in a canonical order such that left turns and
//! straights traverse the array forward from index 0, while right turns
//! traverse it backward from the last index. Either way the train moves
//! entry edge to exit edge; only the index bookkeeping differs.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::config::CELL_SIZE;
use crate::grid::TrackGrid;
use crate::segment::RailSegment;

/// Waypoints per segment. Odd, so `MIDPOINT` is exact.
pub const PATH_LEN: usize = 5;
/// Index of the middle waypoint.
pub const MIDPOINT: usize = PATH_LEN / 2;

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPath {
    pub points: [Vec3; PATH_LEN],
}

impl SegmentPath {
    /// Build the waypoint polyline for a powered segment. Unpowered
    /// segments have no path.
    pub fn for_segment(segment: &RailSegment) -> Option<Self> {
        if !segment.is_powered() {
            return None;
        }
        let center = TrackGrid::grid_to_world(segment.position);
        let half = 0.5 * CELL_SIZE;
        let in_w = segment.in_dir.as_vec3() * half;
        let out_w = segment.out_dir.as_vec3() * half;
        let entry = center - in_w;
        let exit = center + out_w;

        let mut points = [Vec3::ZERO; PATH_LEN];
        if segment.in_dir == segment.out_dir {
            for (i, p) in points.iter_mut().enumerate() {
                *p = entry.lerp(exit, i as f32 / (PATH_LEN - 1) as f32);
            }
        } else {
            // Quarter arc of radius half a cell around the corner pivot.
            // The pivot is equidistant from the entry and exit edge
            // midpoints, so the polyline stays continuous across cells.
            let pivot = center - in_w + out_w;
            let radial = entry - pivot;
            for (i, p) in points.iter_mut().enumerate() {
                let theta = FRAC_PI_2 * i as f32 / (PATH_LEN - 1) as f32;
                *p = pivot + radial * theta.cos() + in_w * theta.sin();
            }
        }

        // Right turns traverse backward through the canonical array.
        if crate::direction::turn_sign(segment.in_dir, segment.out_dir) > 0 {
            points.reverse();
        }
        Some(Self { points })
    }

    /// Index a train starts from when it enters this path at the entry
    /// edge: the last index for right turns, 0 otherwise.
    pub fn entry_index(turn: i32) -> usize {
        if turn > 0 {
            PATH_LEN - 1
        } else {
            0
        }
    }

    /// Cursor step direction paired with `entry_index`.
    pub fn entry_step(turn: i32) -> i32 {
        if turn > 0 {
            -1
        } else {
            1
        }
    }

    /// Traversal-forward unit vector at a waypoint: toward the next
    /// waypoint in travel order, or along the final leg at the path end.
    pub fn forward_at(&self, index: usize, step: i32) -> Vec3 {
        let next = index as i32 + step;
        if (0..PATH_LEN as i32).contains(&next) {
            (self.points[next as usize] - self.points[index]).normalize_or_zero()
        } else {
            let prev = index as i32 - step;
            (self.points[index] - self.points[prev as usize]).normalize_or_zero()
        }
    }

    /// Length of the leg ending at `index` in travel order.
    pub fn leg_length(&self, index: usize, step: i32) -> f32 {
        let prev = index as i32 - step;
        if (0..PATH_LEN as i32).contains(&prev) {
            self.points[index].distance(self.points[prev as usize])
        } else {
            let next = (index as i32 + step).clamp(0, PATH_LEN as i32 - 1);
            self.points[index].distance(self.points[next as usize])
        }
    }
}
