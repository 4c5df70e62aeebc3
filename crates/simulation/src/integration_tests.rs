//! End-to-end tests driving the full `FixedUpdate` pipeline through
//! [`TestNetwork`].

use bevy::prelude::*;

use crate::direction::Cardinal;
use crate::events::{RailEventJournal, RailEventKind};
use crate::fleet::{FleetSpeed, TrainKind};
use crate::invariant_checks::ChainInvariantViolations;
use crate::stats::RailStats;
use crate::test_harness::TestNetwork;
use crate::track_actions::{ActionError, ActionOutcome, ActionOutcomeLog, TrackAction};
use crate::traversal::DriveState;

// ---------------------------------------------------------------------------
// Full ride lifecycle
// ---------------------------------------------------------------------------

/// A leader rides a three-segment line to its end, terminates exactly
/// once, and is still observable afterward.
#[test]
fn test_leader_rides_the_line_and_falls_off() {
    let mut net = TestNetwork::new()
        .with_start(10, 10, Cardinal::North)
        .with_segment(10, 11)
        .with_segment(10, 12);
    let first = net.segment_at(10, 10).unwrap();
    let third = net.segment_at(10, 12).unwrap();
    let train = net.spawn_train(10, 10, TrainKind::Leader);

    let mut last_segment = first;
    for _ in 0..400 {
        if net.state_of(train) == DriveState::Terminated {
            break;
        }
        if let Some(seg) = net.on_segment_of(train) {
            last_segment = seg;
        }
        net.tick(1);
    }

    assert_eq!(net.state_of(train), DriveState::Terminated);
    assert_eq!(last_segment, third);
    assert_eq!(net.on_segment_of(train), None);
    assert_eq!(net.segment(third).occupant, None);

    let destroyed = net
        .resource::<RailEventJournal>()
        .events
        .iter()
        .filter(|e| matches!(e.kind, RailEventKind::TrainDestroyed(_)))
        .count();
    assert_eq!(destroyed, 1);
    assert_eq!(net.resource::<RailStats>().trains_lost, 1);
    assert_eq!(net.resource::<RailStats>().trains_active, 0);
}

// ---------------------------------------------------------------------------
// Checkpoints
// ---------------------------------------------------------------------------

/// An open checkpoint never accepts an extension; riding its midpoint
/// converts it, reattaches the forwarded segment, and raises the fleet
/// speed.
#[test]
fn test_checkpoint_converts_on_ride_through() {
    let mut net = TestNetwork::new()
        .with_start(10, 10, Cardinal::North)
        .with_checkpoint(10, 11)
        .with_segment(10, 12);
    let cp = net.segment_at(10, 11).unwrap();
    let ahead = net.segment_at(10, 12).unwrap();

    assert!(net.segment(cp).is_checkpoint);
    assert_eq!(net.segment(cp).next, None);
    assert!(net.segment(ahead).is_powered());
    assert_eq!(net.segment(ahead).prev, None);
    net.tick(1);
    assert_eq!(net.resource::<RailStats>().open_checkpoints, 1);

    let speed_before = net.resource::<FleetSpeed>().cells_per_sec;
    net.spawn_train(10, 10, TrainKind::Leader);
    net.tick(60);

    let cp_seg = net.segment(cp);
    assert!(!cp_seg.is_checkpoint);
    assert!(cp_seg.has_been_ridden);
    assert_eq!(cp_seg.next, Some(ahead));
    assert_eq!(net.segment(ahead).prev, Some(cp));

    assert!(net.resource::<FleetSpeed>().cells_per_sec > speed_before);
    assert_eq!(net.resource::<RailStats>().checkpoints_cleared, 1);
    assert_eq!(net.resource::<RailStats>().open_checkpoints, 0);

    let journal = net.resource::<RailEventJournal>();
    let reached = journal
        .events
        .iter()
        .filter(|e| matches!(e.kind, RailEventKind::CheckpointReached(_)))
        .count();
    let extended = journal
        .events
        .iter()
        .filter(|e| matches!(e.kind, RailEventKind::ChainExtended(_)))
        .count();
    assert_eq!(reached, 1);
    assert_eq!(extended, 1);
}

/// A final checkpoint keeps refusing extensions no matter how many
/// placements try; each one is forwarded through it.
#[test]
fn test_final_checkpoint_never_extends_unridden() {
    let mut net = TestNetwork::new()
        .with_start(10, 10, Cardinal::North)
        .with_checkpoint(10, 11);
    let cp = net.segment_at(10, 11).unwrap();

    net = net.with_segment(10, 12);
    assert_eq!(net.segment(cp).next, None);
    net = net.with_segment(11, 11);
    assert_eq!(net.segment(cp).next, None);
    assert!(net.segment(cp).is_checkpoint);
}

// ---------------------------------------------------------------------------
// Pause determinism
// ---------------------------------------------------------------------------

fn long_line() -> (TestNetwork, Entity) {
    let mut net = TestNetwork::new().with_start(10, 10, Cardinal::North);
    for z in 11..=30 {
        net = net.with_segment(10, z);
    }
    let train = net.spawn_train(10, 10, TrainKind::Leader);
    (net, train)
}

/// Pausing and resuming mid-run leaves position, cursor, and occupancy
/// bit-for-bit identical to an uninterrupted run with the same number
/// of driving ticks.
#[test]
fn test_suspension_is_idempotent() {
    let (mut plain, plain_train) = long_line();
    plain.tick(120);

    let (mut paused, paused_train) = long_line();
    paused.tick(40);
    paused.set_paused(true);
    paused.tick(57);
    assert_eq!(paused.state_of(paused_train), DriveState::Suspended);
    paused.set_paused(false);
    paused.tick(80);

    assert_eq!(
        plain.position_of(plain_train).to_array(),
        paused.position_of(paused_train).to_array()
    );
    assert_eq!(
        plain.cursor_of(plain_train).index,
        paused.cursor_of(paused_train).index
    );
    assert_eq!(
        plain.cursor_of(plain_train).step,
        paused.cursor_of(paused_train).step
    );
    assert_eq!(
        plain.on_segment_of(plain_train),
        paused.on_segment_of(paused_train)
    );
}

// ---------------------------------------------------------------------------
// Follower coupling and occupancy
// ---------------------------------------------------------------------------

/// Followers drive only while the leader does: once the leader falls
/// off the track, every follower freezes in place. No two trains ever
/// share a segment along the way.
#[test]
fn test_followers_freeze_when_the_leader_is_lost() {
    let mut net = TestNetwork::new()
        .with_start(10, 10, Cardinal::North)
        .with_segment(10, 11)
        .with_segment(10, 12)
        .with_segment(10, 13);
    let leader = net.spawn_train(10, 12, TrainKind::Leader);
    let follower = net.spawn_train(10, 10, TrainKind::Follower);

    for _ in 0..40 {
        net.tick(1);
        let l = net.on_segment_of(leader);
        let f = net.on_segment_of(follower);
        if let (Some(l), Some(f)) = (l, f) {
            assert_ne!(l, f);
        }
    }

    assert_eq!(net.state_of(leader), DriveState::Terminated);
    assert_eq!(net.state_of(follower), DriveState::Suspended);

    let frozen = net.position_of(follower);
    net.tick(10);
    assert_eq!(net.position_of(follower).to_array(), frozen.to_array());
}

// ---------------------------------------------------------------------------
// Action pipeline
// ---------------------------------------------------------------------------

/// Build, split, and probe the track entirely through queued actions,
/// checking the outcome log and the split semantics.
#[test]
fn test_action_pipeline_builds_and_splits() {
    let mut net = TestNetwork::new();
    net.push_action(TrackAction::PlaceStart {
        pos: (10, 10),
        dir: Cardinal::North,
    });
    net.push_action(TrackAction::PlaceSegment {
        pos: (10, 11),
        checkpoint: false,
    });
    net.push_action(TrackAction::PlaceSegment {
        pos: (10, 12),
        checkpoint: false,
    });
    net.tick(1);

    let seed = net.segment_at(10, 10).unwrap();
    let tail = net.segment_at(10, 12).unwrap();
    assert!(net.segment(tail).is_powered());
    assert_eq!(net.resource::<RailStats>().segments, 3);
    assert_eq!(net.resource::<RailStats>().chains, 1);

    net.push_action(TrackAction::RemoveSegment { pos: (10, 11) });
    net.push_action(TrackAction::RemoveSegment { pos: (10, 10) });
    net.push_action(TrackAction::SetSpeed {
        cells_per_sec: -1.0,
    });
    net.tick(1);

    let outcomes = net.resource::<ActionOutcomeLog>();
    let last = outcomes.last_n(3);
    assert_eq!(last[0].1, ActionOutcome::Success);
    assert_eq!(last[1].1, ActionOutcome::Error(ActionError::StartsPowered));
    assert!(matches!(
        last[2].1,
        ActionOutcome::Error(ActionError::InvalidParameter(_))
    ));

    // The cut leaves two one-segment chains: the seed keeps its power,
    // the tail reverts to unpowered.
    assert_eq!(net.segment(seed).next, None);
    assert!(net.segment(seed).is_powered());
    assert!(!net.segment(tail).is_powered());
    assert_eq!(net.segment(tail).prev, None);
}

/// Spawn preconditions surface as logged errors: one leader at most,
/// no stacking, no unpowered spawns.
#[test]
fn test_spawn_rejections_are_logged() {
    let mut net = TestNetwork::new()
        .with_start(10, 10, Cardinal::North)
        .with_segment(10, 11);
    net.push_action(TrackAction::PlaceSegment {
        pos: (20, 20),
        checkpoint: false,
    });
    net.push_action(TrackAction::SpawnLeader {
        pos: (10, 10),
        tier: 0,
    });
    net.push_action(TrackAction::SpawnLeader {
        pos: (10, 11),
        tier: 0,
    });
    net.push_action(TrackAction::SpawnFollower {
        pos: (10, 10),
        tier: 1,
    });
    net.push_action(TrackAction::SpawnFollower {
        pos: (20, 20),
        tier: 1,
    });
    net.tick(1);

    let outcomes = net.resource::<ActionOutcomeLog>();
    let last = outcomes.last_n(4);
    assert_eq!(last[0].1, ActionOutcome::Success);
    assert_eq!(last[1].1, ActionOutcome::Error(ActionError::LeaderExists));
    assert_eq!(last[2].1, ActionOutcome::Error(ActionError::Occupied));
    assert_eq!(last[3].1, ActionOutcome::Error(ActionError::NotPowered));
}

/// Terminated trains return to the hand through the action surface,
/// but only in edit mode.
#[test]
fn test_terminated_train_pickup_via_actions() {
    let mut net = TestNetwork::new().with_start(10, 10, Cardinal::North);
    let train = net.spawn_train(10, 10, TrainKind::Leader);
    net.tick(40);
    assert_eq!(net.state_of(train), DriveState::Terminated);

    net.push_action(TrackAction::PickUpTrain);
    net.tick(1);
    assert_eq!(
        net.resource::<ActionOutcomeLog>().last_n(1)[0].1,
        ActionOutcome::Error(ActionError::EditModeRequired)
    );

    net.push_action(TrackAction::SetEditMode { edit_mode: true });
    net.push_action(TrackAction::PickUpTrain);
    net.tick(1);
    assert_eq!(
        net.resource::<ActionOutcomeLog>().last_n(1)[0].1,
        ActionOutcome::Success
    );
    assert_eq!(net.state_of(train), DriveState::Idle);
}

// ---------------------------------------------------------------------------
// Invariant audits
// ---------------------------------------------------------------------------

/// A corrupted link is detected and severed by the slow-tick audit, and
/// a stray occupancy claim is vacated.
#[test]
fn test_slow_audit_repairs_corruption() {
    let mut net = TestNetwork::new()
        .with_start(10, 10, Cardinal::North)
        .with_segment(10, 11)
        .with_segment(10, 12);
    let a = net.segment_at(10, 10).unwrap();
    let b = net.segment_at(10, 11).unwrap();
    let c = net.segment_at(10, 12).unwrap();

    net.corrupt_track(|store| {
        store.get_mut(b).unwrap().prev = None;
        store.get_mut(c).unwrap().occupant = Some(Entity::from_raw(9999));
    });
    net.tick_slow_cycle();

    let violations = net.resource::<ChainInvariantViolations>();
    assert!(violations.link_symmetry >= 1);
    assert!(violations.occupancy >= 1);
    assert_eq!(violations.shape, 0);

    assert_eq!(net.segment(a).next, None);
    assert_eq!(net.segment(c).occupant, None);
}
