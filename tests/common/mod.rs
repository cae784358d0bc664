//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - `TimeUpdateStrategy::ManualDuration` makes every `app.update()` advance
//!   exactly `FRAME`, so fixed ticks are deterministic.
//! - we then call `lane_runner::game::configure_headless` to install gameplay plugins.

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use lane_runner::common::state::GameState;
use lane_runner::common::tunables::Tunables;

pub const FRAME: Duration = Duration::from_millis(100);

/// Seeded defaults.
pub fn seeded() -> Tunables {
    Tunables {
        seed: Some(42),
        ..default()
    }
}

pub fn app_headless() -> App {
    app_headless_with(seeded())
}

pub fn app_headless_with(tunables: Tunables) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .insert_resource(tunables);

    lane_runner::game::configure_headless(&mut app);
    app
}

pub fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

/// Update until `done` holds or `max_frames` run out. Returns frames used.
pub fn run_until(app: &mut App, max_frames: usize, done: impl Fn(&App) -> bool) -> Option<usize> {
    for frame in 0..max_frames {
        app.update();
        if done(app) {
            return Some(frame + 1);
        }
    }
    None
}
