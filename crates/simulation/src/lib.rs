//! Headless rail network simulation.
//!
//! Track segments placed at runtime link into directed chains; a leader
//! engine and its follower cars traverse the chains with continuous
//! motion, checkpoint gating, and end-of-track destruction. Everything
//! runs on `FixedUpdate` at 10 Hz and is driven exclusively through the
//! [`track_actions::ActionQueue`], so a headless `App` ticks
//! deterministically.

use bevy::prelude::*;

pub mod checkpoint;
pub mod config;
pub mod connectivity;
pub mod direction;
pub mod events;
pub mod fleet;
pub mod grid;
pub mod invariant_checks;
pub mod path;
pub mod run_flags;
pub mod segment;
pub mod simulation_sets;
pub mod stats;
pub mod track_actions;
pub mod traversal;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod test_harness;

pub use simulation_sets::SimulationSet;

use crate::config::TICK_SECONDS;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each FixedUpdate, used for stamping
/// queued actions and journal entries.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Shared throttle timer for audit systems that don't need to run every
/// tick.
#[derive(Resource, Default)]
pub struct SlowTickTimer {
    pub counter: u32,
}

impl SlowTickTimer {
    pub const INTERVAL: u32 = 100; // run slow systems every 100 ticks (~10 seconds at 10Hz)

    pub fn tick(&mut self) {
        self.counter += 1;
    }

    pub fn should_run(&self) -> bool {
        self.counter.is_multiple_of(Self::INTERVAL)
    }
}

pub fn tick_counters(mut timer: ResMut<SlowTickTimer>, mut tick: ResMut<TickCounter>) {
    timer.tick();
    tick.0 = tick.0.wrapping_add(1);
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct RailSimPlugin;

impl Plugin for RailSimPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PreSim,
                SimulationSet::Simulation,
                SimulationSet::PostSim,
            )
                .chain(),
        );
        app.insert_resource(Time::<Fixed>::from_seconds(TICK_SECONDS as f64));

        app.init_resource::<TickCounter>()
            .init_resource::<SlowTickTimer>()
            .init_resource::<segment::SegmentStore>()
            .init_resource::<grid::TrackGrid>()
            .init_resource::<run_flags::RunFlags>()
            .add_systems(FixedUpdate, tick_counters.in_set(SimulationSet::PreSim));

        app.add_plugins((
            track_actions::TrackActionsPlugin,
            traversal::TraversalPlugin,
            fleet::FleetPlugin,
            events::EventsPlugin,
            stats::StatsPlugin,
            invariant_checks::InvariantChecksPlugin,
        ));
    }
}
