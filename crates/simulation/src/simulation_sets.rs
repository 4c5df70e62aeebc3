//! Deterministic simulation ordering via `SystemSet` phases.
//!
//! These sets establish a contract for system execution order within the
//! `FixedUpdate` schedule. Plugins place their systems into the
//! appropriate set so that inter-plugin ordering is explicit and
//! testable rather than relying on implicit timing assumptions.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – Tick counters and queued action execution, so graph
//!   edits land before any train moves this tick.
//! * **Simulation** – Train stepping, checkpoint conversion, speed
//!   recomputation.
//! * **PostSim** – Aggregation and reporting: stats, the event journal,
//!   invariant audits. These only read simulation state.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
///
/// Configured as a chain: `PreSim` → `Simulation` → `PostSim`.
/// Individual plugins use `.in_set(SimulationSet::X)` when registering
/// their systems, retaining the ability to add fine-grained `.after()`
/// constraints within the same phase.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Tick counters and track/train action execution.
    PreSim,
    /// Core motion: traversal stepping and lifecycle effects.
    Simulation,
    /// Stats, journal, invariant audits.
    PostSim,
}
