use bevy::prelude::*;

use crate::segment::SegmentId;
use crate::simulation_sets::SimulationSet;
use crate::TickCounter;

// =============================================================================
// Event Types
// =============================================================================

/// A train crossed the midpoint of the final open checkpoint.
#[derive(Event, Debug, Clone, Copy)]
pub struct CheckpointReached {
    pub segment: SegmentId,
    pub train: Entity,
}

/// A train ran off the end of its chain and was destroyed.
#[derive(Event, Debug, Clone, Copy)]
pub struct TrainDestroyed {
    pub train: Entity,
    pub segment: SegmentId,
}

/// The chain grew past a segment, by placement or by checkpoint
/// conversion reattaching a forwarded segment.
#[derive(Event, Debug, Clone, Copy)]
pub struct ChainExtended {
    pub segment: SegmentId,
}

// =============================================================================
// Journal
// =============================================================================

#[derive(Debug, Clone)]
pub enum RailEventKind {
    CheckpointReached(SegmentId),
    TrainDestroyed(SegmentId),
    ChainExtended(SegmentId),
}

#[derive(Debug, Clone)]
pub struct RailEvent {
    pub kind: RailEventKind,
    pub tick: u64,
}

/// Bounded history of rail lifecycle events, oldest first.
#[derive(Resource)]
pub struct RailEventJournal {
    pub events: Vec<RailEvent>,
    pub max_events: usize,
}

impl Default for RailEventJournal {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            max_events: 200,
        }
    }
}

impl RailEventJournal {
    /// Push a new event into the journal, trimming old events if over capacity.
    pub fn push(&mut self, event: RailEvent) {
        self.events.push(event);
        if self.events.len() > self.max_events {
            let excess = self.events.len() - self.max_events;
            self.events.drain(0..excess);
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

fn journal_rail_events(
    tick: Res<TickCounter>,
    journal: Option<ResMut<RailEventJournal>>,
    mut checkpoints: EventReader<CheckpointReached>,
    mut destroyed: EventReader<TrainDestroyed>,
    mut extended: EventReader<ChainExtended>,
) {
    let Some(mut journal) = journal else { return };
    for ev in checkpoints.read() {
        journal.push(RailEvent {
            kind: RailEventKind::CheckpointReached(ev.segment),
            tick: tick.0,
        });
    }
    for ev in destroyed.read() {
        journal.push(RailEvent {
            kind: RailEventKind::TrainDestroyed(ev.segment),
            tick: tick.0,
        });
    }
    for ev in extended.read() {
        journal.push(RailEvent {
            kind: RailEventKind::ChainExtended(ev.segment),
            tick: tick.0,
        });
    }
}

pub struct EventsPlugin;

impl Plugin for EventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CheckpointReached>()
            .add_event::<TrainDestroyed>()
            .add_event::<ChainExtended>()
            .init_resource::<RailEventJournal>()
            .add_systems(
                FixedUpdate,
                journal_rail_events.in_set(SimulationSet::PostSim),
            );
    }
}
