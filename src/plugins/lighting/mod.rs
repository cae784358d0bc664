//! Lighting plugin (Firefly) (render-only): a warm light riding on the player.

use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::plugins::world::{RenderHandle, SceneEntities};

#[derive(Component)]
pub struct PlayerLight;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(Startup, setup)
        .add_systems(Update, follow_player_light);
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: Color::srgb(1.0, 0.9, 0.75),
            radius: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
    ));
}

fn follow_player_light(
    entities: Res<SceneEntities>,
    q_sprites: Query<&Transform, Without<PlayerLight>>,
    mut q_light: Query<&mut Transform, With<PlayerLight>>,
) {
    let Some(player) = entities.body(RenderHandle::PLAYER) else {
        return;
    };
    let Ok(tf_player) = q_sprites.get(player) else {
        return;
    };
    let Ok(mut tf_light) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_player.translation.x;
    tf_light.translation.y = tf_player.translation.y;
}
