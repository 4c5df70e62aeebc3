//! Plugin that wires up the track-actions subsystem: queue, executor,
//! and outcome log.

use bevy::prelude::*;

use super::executor::execute_queued_actions;
use super::result_log::ActionOutcomeLog;
use super::ActionQueue;
use crate::simulation_sets::SimulationSet;
use crate::tick_counters;

/// Registers the action queue, outcome log, and executor system.
pub struct TrackActionsPlugin;

impl Plugin for TrackActionsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionQueue>();
        app.init_resource::<ActionOutcomeLog>();

        // Actions land after the tick counter advances, so logged ticks
        // match the tick the mutation takes effect on.
        app.add_systems(
            FixedUpdate,
            execute_queued_actions
                .in_set(SimulationSet::PreSim)
                .after(tick_counters),
        );
    }
}
