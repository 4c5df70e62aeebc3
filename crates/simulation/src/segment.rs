//! Rail segments and the registry that owns them.
//!
//! A `RailSegment` is one grid cell of track. Segments link into simple
//! open chains through `prev`/`next` handles; the `SegmentStore` slab is
//! the single owner of segment data, so handles held elsewhere (grid
//! cells, neighbor links, train occupancy) are weak by construction and
//! resolve to `None` once a segment is picked up.

use bevy::prelude::*;

use crate::direction::{facing_of, shape_of, SegmentShape};

/// Handle into the `SegmentStore` slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(pub u32);

#[derive(Debug, Clone)]
pub struct RailSegment {
    /// Integer grid coordinate; `y` is fixed to the track plane.
    pub position: IVec3,
    /// Incoming unit direction; zero when unpowered.
    pub in_dir: IVec3,
    /// Outgoing unit direction; zero when unpowered.
    pub out_dir: IVec3,
    pub shape: SegmentShape,
    /// Derived facing vector; zero when unpowered.
    pub facing: IVec3,
    pub prev: Option<SegmentId>,
    pub next: Option<SegmentId>,
    /// Train currently riding this segment, if any.
    pub occupant: Option<Entity>,
    /// Checkpoint segments terminate the chain until ridden through.
    pub is_checkpoint: bool,
    /// Set once a train has ridden (or been credited with riding) this
    /// segment; ride-locks pickup.
    pub has_been_ridden: bool,
    /// The seed segment of a network is powered at creation and can
    /// never be picked up.
    pub starts_powered: bool,
}

impl RailSegment {
    /// A freshly placed, unpowered segment.
    pub fn new(position: IVec3) -> Self {
        Self {
            position,
            in_dir: IVec3::ZERO,
            out_dir: IVec3::ZERO,
            shape: SegmentShape::Straight,
            facing: IVec3::ZERO,
            prev: None,
            next: None,
            occupant: None,
            is_checkpoint: false,
            has_been_ridden: false,
            starts_powered: false,
        }
    }

    /// Powered means carrying a valid, non-zero direction pair. A seed
    /// segment is powered from creation; every other segment becomes
    /// powered only through the connectivity engine.
    pub fn is_powered(&self) -> bool {
        self.in_dir != IVec3::ZERO && self.out_dir != IVec3::ZERO
    }

    /// A checkpoint that still terminates its chain.
    pub fn is_final_checkpoint(&self) -> bool {
        self.is_checkpoint && self.next.is_none()
    }

    /// Set the direction pair and rederive shape and facing.
    pub fn set_directions(&mut self, in_dir: IVec3, out_dir: IVec3) {
        self.in_dir = in_dir;
        self.out_dir = out_dir;
        self.shape = shape_of(in_dir, out_dir);
        self.facing = facing_of(in_dir, out_dir);
    }

    /// Revert to the unpowered state (zero directions, straight shape).
    pub fn clear_power(&mut self) {
        self.in_dir = IVec3::ZERO;
        self.out_dir = IVec3::ZERO;
        self.shape = SegmentShape::Straight;
        self.facing = IVec3::ZERO;
    }
}

/// Slab registry owning all placed segments. Freed slots are recycled,
/// so a `SegmentId` is only valid until its segment is removed.
#[derive(Resource, Default)]
pub struct SegmentStore {
    slots: Vec<Option<RailSegment>>,
    free: Vec<u32>,
}

impl SegmentStore {
    pub fn insert(&mut self, segment: RailSegment) -> SegmentId {
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Some(segment);
            SegmentId(idx)
        } else {
            self.slots.push(Some(segment));
            SegmentId(self.slots.len() as u32 - 1)
        }
    }

    pub fn remove(&mut self, id: SegmentId) -> Option<RailSegment> {
        let slot = self.slots.get_mut(id.0 as usize)?;
        let segment = slot.take();
        if segment.is_some() {
            self.free.push(id.0);
        }
        segment
    }

    pub fn get(&self, id: SegmentId) -> Option<&RailSegment> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut RailSegment> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &RailSegment)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|seg| (SegmentId(i as u32), seg)))
    }

    /// Ids of all live segments; avoids holding a borrow while mutating.
    pub fn ids(&self) -> Vec<SegmentId> {
        self.iter().map(|(id, _)| id).collect()
    }
}
