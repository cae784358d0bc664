//! Core plugin: shared resources and global settings.

use crate::common::tunables::Tunables;
use bevy::prelude::*;

/// Fixed simulation rate of the game loop tick.
pub const TICK_HZ: f64 = 60.0;

pub fn plugin(app: &mut App) {
    // A caller-provided `Tunables` (CLI / config file / tests) wins.
    if !app.world().contains_resource::<Tunables>() {
        app.insert_resource(Tunables::default());
    }
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)))
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ));
}
