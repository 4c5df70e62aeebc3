//! Direction and shape geometry for track segments.
//!
//! Everything here is a pure function of a pair of unit grid directions:
//! the shape a segment renders with, which way a bend turns, and the
//! facing vector derived from the turn. The connectivity engine and the
//! traversal stepper both consume these; neither holds geometry state of
//! its own.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Cardinal grid direction on the track plane (Y-up world, north = +Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinal {
    North,
    East,
    South,
    West,
}

impl Cardinal {
    /// Fixed candidate scan order for the connectivity engine:
    /// forward, right, back, left relative to world axes. The first
    /// eligible neighbor in this order wins the tie-break.
    pub const SCAN_ORDER: [Cardinal; 4] =
        [Cardinal::North, Cardinal::East, Cardinal::South, Cardinal::West];

    pub fn offset(self) -> IVec3 {
        match self {
            Cardinal::North => IVec3::new(0, 0, 1),
            Cardinal::East => IVec3::new(1, 0, 0),
            Cardinal::South => IVec3::new(0, 0, -1),
            Cardinal::West => IVec3::new(-1, 0, 0),
        }
    }
}

/// Rendered shape of a powered segment, derived from its direction pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SegmentShape {
    #[default]
    Straight,
    Bent,
}

/// `Straight` iff the segment passes through without turning.
pub fn shape_of(in_dir: IVec3, out_dir: IVec3) -> SegmentShape {
    if in_dir == out_dir {
        SegmentShape::Straight
    } else {
        SegmentShape::Bent
    }
}

/// Turn classification of a direction pair: the sign of the vertical
/// component of `in_dir x out_dir`. `+1` is a right turn, `-1` a left
/// turn, `0` straight through.
pub fn turn_sign(in_dir: IVec3, out_dir: IVec3) -> i32 {
    in_dir.cross(out_dir).y.signum()
}

/// Facing vector for a powered segment: bends face their outgoing
/// direction when turning right and the reversed incoming direction when
/// turning left; straight segments face straight through.
pub fn facing_of(in_dir: IVec3, out_dir: IVec3) -> IVec3 {
    if turn_sign(in_dir, out_dir) < 0 {
        -in_dir
    } else {
        out_dir
    }
}
