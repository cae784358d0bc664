//! Test helpers.
//!
//! Bevy provides `World::run_system_once` (via the `RunSystemOnce` trait) for quickly
//! executing a system in tests without building a full schedule.
//!
//! Systems that use `Commands` enqueue structural changes; we call `world.flush()` after
//! running so queued commands are applied before assertions.

use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::common::tunables::Tunables;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Default tunables with a fixed seed and spawning pushed far enough out
/// that nothing spawns unless a test asks for it.
pub fn quiet_tunables() -> Tunables {
    Tunables {
        seed: Some(0x5EED),
        spawn_interval_min: 1_000.0,
        spawn_interval_max: 1_000.0,
        ..default()
    }
}
