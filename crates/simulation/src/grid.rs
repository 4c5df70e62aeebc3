use bevy::prelude::*;

use crate::config::{CELL_SIZE, GRID_HEIGHT, GRID_WIDTH, TRACK_PLANE_Y};
use crate::segment::SegmentId;

/// Spatial index of the track plane: one cell per integer (x, z)
/// coordinate, holding the id of the segment occupying it, if any.
///
/// The grid owns segment placement; segments reference each other only
/// through `SegmentId` handles, never owning pointers.
#[derive(Resource)]
pub struct TrackGrid {
    cells: Vec<Option<SegmentId>>,
    pub width: usize,
    pub height: usize,
}

impl Default for TrackGrid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl TrackGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![None; width * height],
            width,
            height,
        }
    }

    #[inline]
    fn index(&self, pos: IVec3) -> usize {
        pos.z as usize * self.width + pos.x as usize
    }

    /// A position is valid only on the track plane and inside the grid.
    #[inline]
    pub fn in_bounds(&self, pos: IVec3) -> bool {
        pos.y == TRACK_PLANE_Y
            && pos.x >= 0
            && pos.z >= 0
            && (pos.x as usize) < self.width
            && (pos.z as usize) < self.height
    }

    pub fn segment_at(&self, pos: IVec3) -> Option<SegmentId> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.index(pos)]
    }

    /// Record `id` as occupying `pos`. Returns false if out of bounds or
    /// the cell is already taken.
    pub fn place(&mut self, pos: IVec3, id: SegmentId) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        let idx = self.index(pos);
        if self.cells[idx].is_some() {
            return false;
        }
        self.cells[idx] = Some(id);
        true
    }

    pub fn clear(&mut self, pos: IVec3) {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.cells[idx] = None;
        }
    }

    /// World-space center of a grid cell.
    pub fn grid_to_world(pos: IVec3) -> Vec3 {
        Vec3::new(
            (pos.x as f32 + 0.5) * CELL_SIZE,
            pos.y as f32 * CELL_SIZE,
            (pos.z as f32 + 0.5) * CELL_SIZE,
        )
    }
}
