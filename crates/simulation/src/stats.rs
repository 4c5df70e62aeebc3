use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::events::{CheckpointReached, TrainDestroyed};
use crate::segment::SegmentStore;
use crate::simulation_sets::SimulationSet;
use crate::traversal::{DriveState, Train};

#[derive(Resource, Default, Debug, Clone, Serialize, Deserialize)]
pub struct RailStats {
    pub segments: u32,
    pub powered: u32,
    /// Powered chain heads (no incoming link).
    pub chains: u32,
    pub open_checkpoints: u32,
    pub trains_active: u32,
    /// Cumulative trains lost off the end of a chain.
    pub trains_lost: u32,
    /// Cumulative checkpoint passes.
    pub checkpoints_cleared: u32,
}

pub fn update_stats(
    store: Res<SegmentStore>,
    trains: Query<&DriveState, With<Train>>,
    mut destroyed: EventReader<TrainDestroyed>,
    mut checkpoints: EventReader<CheckpointReached>,
    mut stats: ResMut<RailStats>,
) {
    let mut powered = 0u32;
    let mut chains = 0u32;
    let mut open_checkpoints = 0u32;
    for (_, segment) in store.iter() {
        if segment.is_powered() {
            powered += 1;
            if segment.prev.is_none() {
                chains += 1;
            }
        }
        if segment.is_checkpoint {
            open_checkpoints += 1;
        }
    }

    stats.segments = store.len() as u32;
    stats.powered = powered;
    stats.chains = chains;
    stats.open_checkpoints = open_checkpoints;
    stats.trains_active = trains
        .iter()
        .filter(|s| matches!(s, DriveState::Driving | DriveState::Suspended))
        .count() as u32;
    stats.trains_lost += destroyed.read().count() as u32;
    stats.checkpoints_cleared += checkpoints.read().count() as u32;
}

pub struct StatsPlugin;

impl Plugin for StatsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RailStats>()
            .add_systems(FixedUpdate, update_stats.in_set(SimulationSet::PostSim));
    }
}
