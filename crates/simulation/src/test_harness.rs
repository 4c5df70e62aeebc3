//! # TestNetwork — headless integration test harness
//!
//! Wraps `bevy::app::App` + `RailSimPlugin` for running integration
//! tests without a window or renderer. Builder methods mutate track
//! state directly through the same engine functions the executor uses;
//! action-driven tests go through [`ActionQueue`] instead.

use bevy::app::App;
use bevy::prelude::*;

use crate::connectivity;
use crate::direction::Cardinal;
use crate::fleet::{make_train, TrainKind};
use crate::grid::TrackGrid;
use crate::run_flags::RunFlags;
use crate::segment::{RailSegment, SegmentId, SegmentStore};
use crate::track_actions::{ActionQueue, TrackAction};
use crate::traversal::{DriveState, OnSegment, PathCursor, TrainPosition};
use crate::{RailSimPlugin, SlowTickTimer, TickCounter};

/// A headless Bevy App wrapping `RailSimPlugin` for integration testing.
pub struct TestNetwork {
    app: App,
}

impl TestNetwork {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(RailSimPlugin);
        // Run one update so Startup systems execute.
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by directly executing the `FixedUpdate`
    /// schedule. This bypasses Bevy's time system entirely, which avoids
    /// issues with `MinimalPlugins` not advancing virtual time between
    /// updates.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
            std::thread::yield_now();
        }
    }

    /// Run until the SlowTickTimer fires at least once (~100 ticks).
    pub fn tick_slow_cycle(&mut self) {
        self.tick(SlowTickTimer::INTERVAL);
    }

    // -----------------------------------------------------------------------
    // Track setup
    // -----------------------------------------------------------------------

    fn with_track<R>(&mut self, f: impl FnOnce(&mut SegmentStore, &mut TrackGrid) -> R) -> R {
        self.app
            .world_mut()
            .resource_scope(|world, mut store: Mut<SegmentStore>| {
                let mut grid = world.resource_mut::<TrackGrid>();
                f(&mut store, &mut grid)
            })
    }

    /// Seed a chain with a powered start segment.
    pub fn with_start(mut self, x: i32, z: i32, dir: Cardinal) -> Self {
        self.with_track(|store, grid| {
            connectivity::place_start(store, grid, IVec3::new(x, 0, z), dir)
                .expect("start placement failed");
        });
        self
    }

    /// Place an ordinary segment and connect it.
    pub fn with_segment(mut self, x: i32, z: i32) -> Self {
        self.with_track(|store, grid| {
            connectivity::place_segment(store, grid, IVec3::new(x, 0, z), false)
                .expect("segment placement failed");
        });
        self
    }

    /// Place a checkpoint segment and connect it.
    pub fn with_checkpoint(mut self, x: i32, z: i32) -> Self {
        self.with_track(|store, grid| {
            connectivity::place_segment(store, grid, IVec3::new(x, 0, z), true)
                .expect("checkpoint placement failed");
        });
        self
    }

    /// Drop a train onto the segment at the given cell and record its
    /// occupancy, exactly as the action executor does.
    pub fn spawn_train(&mut self, x: i32, z: i32, kind: TrainKind) -> Entity {
        let world = self.app.world_mut();
        let id = world
            .resource::<TrackGrid>()
            .segment_at(IVec3::new(x, 0, z))
            .expect("no segment at spawn cell");
        let bundle =
            make_train(world.resource::<SegmentStore>(), id, kind, 0).expect("unspawnable segment");
        let entity = world.spawn(bundle).id();
        world
            .resource_mut::<SegmentStore>()
            .get_mut(id)
            .expect("segment vanished")
            .occupant = Some(entity);
        entity
    }

    // -----------------------------------------------------------------------
    // Actions and flags
    // -----------------------------------------------------------------------

    /// Queue an action for the next tick's executor pass.
    pub fn push_action(&mut self, action: TrackAction) {
        let tick = self.app.world().resource::<TickCounter>().0;
        self.app
            .world_mut()
            .resource_mut::<ActionQueue>()
            .push(tick, action);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.app.world_mut().resource_mut::<RunFlags>().paused = paused;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    /// Mutate track state mid-test (used by corruption tests).
    pub fn corrupt_track(&mut self, f: impl FnOnce(&mut SegmentStore)) {
        f(&mut self.app.world_mut().resource_mut::<SegmentStore>());
    }

    pub fn segment_at(&self, x: i32, z: i32) -> Option<SegmentId> {
        self.resource::<TrackGrid>().segment_at(IVec3::new(x, 0, z))
    }

    /// Clone of the segment at the given id; panics if it is gone.
    pub fn segment(&self, id: SegmentId) -> RailSegment {
        self.resource::<SegmentStore>()
            .get(id)
            .expect("segment missing")
            .clone()
    }

    pub fn state_of(&self, entity: Entity) -> DriveState {
        *self.app.world().get::<DriveState>(entity).expect("no train")
    }

    pub fn on_segment_of(&self, entity: Entity) -> Option<SegmentId> {
        self.app.world().get::<OnSegment>(entity).expect("no train").0
    }

    pub fn position_of(&self, entity: Entity) -> Vec3 {
        self.app
            .world()
            .get::<TrainPosition>(entity)
            .expect("no train")
            .0
    }

    pub fn cursor_of(&self, entity: Entity) -> PathCursor {
        *self.app.world().get::<PathCursor>(entity).expect("no train")
    }
}
