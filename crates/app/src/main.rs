//! Headless demo runner: builds an L-shaped track with one checkpoint
//! gate, spawns a two-train fleet, and runs until the leader falls off
//! the end of the line.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use simulation::config::TICK_SECONDS;
use simulation::direction::Cardinal;
use simulation::events::{CheckpointReached, TrainDestroyed};
use simulation::fleet::FleetSpeed;
use simulation::stats::RailStats;
use simulation::track_actions::{ActionQueue, TrackAction};
use simulation::{RailSimPlugin, TickCounter};

/// Hard cap if the run somehow never terminates.
const MAX_TICKS: u64 = 3_000;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                TICK_SECONDS as f64 / 4.0,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(RailSimPlugin)
        .add_systems(Startup, queue_demo_track)
        .add_systems(Update, (report_progress, watch_run))
        .run();
}

/// Queue the whole demo setup; the executor applies it on the first
/// tick, before any train moves.
fn queue_demo_track(mut queue: ResMut<ActionQueue>) {
    let actions = [
        TrackAction::PlaceStart {
            pos: (10, 10),
            dir: Cardinal::North,
        },
        TrackAction::PlaceSegment {
            pos: (10, 11),
            checkpoint: false,
        },
        TrackAction::PlaceSegment {
            pos: (10, 12),
            checkpoint: false,
        },
        TrackAction::PlaceSegment {
            pos: (10, 13),
            checkpoint: true,
        },
        // Forwarded through the checkpoint until the fleet rides it.
        TrackAction::PlaceSegment {
            pos: (10, 14),
            checkpoint: false,
        },
        TrackAction::PlaceSegment {
            pos: (11, 14),
            checkpoint: false,
        },
        TrackAction::PlaceSegment {
            pos: (12, 14),
            checkpoint: false,
        },
        TrackAction::SpawnLeader {
            pos: (10, 11),
            tier: 0,
        },
        TrackAction::SpawnFollower {
            pos: (10, 10),
            tier: 1,
        },
    ];
    for action in actions {
        queue.push(0, action);
    }
    info!("demo track queued: L-shaped run with a checkpoint gate at (10, 13)");
}

fn report_progress(
    tick: Res<TickCounter>,
    stats: Res<RailStats>,
    speed: Res<FleetSpeed>,
    mut last: Local<u64>,
) {
    if tick.0 == *last || !tick.0.is_multiple_of(25) {
        return;
    }
    *last = tick.0;
    info!(
        "tick {}: {} segments ({} powered), {} trains active, speed {:.2} cells/s",
        tick.0, stats.segments, stats.powered, stats.trains_active, speed.cells_per_sec
    );
}

fn watch_run(
    tick: Res<TickCounter>,
    stats: Res<RailStats>,
    mut checkpoints: EventReader<CheckpointReached>,
    mut destroyed: EventReader<TrainDestroyed>,
    mut exit: EventWriter<AppExit>,
) {
    for ev in checkpoints.read() {
        info!("checkpoint {:?} cleared by {}", ev.segment, ev.train);
    }
    if let Some(ev) = destroyed.read().next() {
        info!(
            "train {} fell off at {:?} after {} ticks ({} checkpoints cleared)",
            ev.train, ev.segment, tick.0, stats.checkpoints_cleared
        );
        exit.send(AppExit::Success);
    } else if tick.0 >= MAX_TICKS {
        warn!("run never terminated within {MAX_TICKS} ticks, giving up");
        exit.send(AppExit::Success);
    }
}
