//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod core;
pub mod enemies;
pub mod game_loop;
pub mod hud;
pub mod player;
pub mod projectiles;
pub mod world;

// Render-only
pub mod camera;
pub mod lighting;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    world::plugin(app);
    hud::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    app.add_plugins(ProjectilesPlugin);
    game_loop::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    world::render_plugin(app);
    hud::render_plugin(app);
    lighting::plugin(app);
    camera::plugin(app);
}
