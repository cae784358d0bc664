//! Camera plugin (render-only).
//!
//! Top-down 2D view of the track. The camera sits over the middle of the
//! visible stretch and eases sideways after the player sprite.
//!
//! ```text
//! Startup:    spawn MainCamera (Firefly-enabled)
//! PostUpdate: follow_player after the scene buffer has been applied
//! ```

use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::world::{RenderHandle, SceneEntities};

/// World depth the camera centres on (metres down the track).
pub const FOCUS_DEPTH: f32 = 30.0;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera).add_systems(
        PostUpdate,
        follow_player.before(TransformSystems::Propagate),
    );
}

fn spawn_camera(mut commands: Commands, tunables: Res<Tunables>) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera { responsiveness: 5.0 },
        FireflyConfig::default(),
        Transform::from_xyz(0.0, FOCUS_DEPTH * tunables.pixels_per_meter, 999.0),
    ));
}

fn follow_player(
    time: Res<Time>,
    entities: Res<SceneEntities>,
    // Disjointness proof: the player sprite is never the camera.
    q_sprites: Query<&Transform, Without<MainCamera>>,
    mut q_cam: Query<(&mut Transform, &MainCamera)>,
) {
    let Some(player) = entities.body(RenderHandle::PLAYER) else { return; };
    let Ok(tf_player) = q_sprites.get(player) else { return; };
    let Ok((mut tf_cam, main_cam)) = q_cam.single_mut() else { return; };

    let dt = time.delta_secs();
    let alpha = 1.0 - (-main_cam.responsiveness * dt).exp();

    tf_cam.translation.x += (tf_player.translation.x - tf_cam.translation.x) * alpha;
}
