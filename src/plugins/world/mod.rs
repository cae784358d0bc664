//! World plugin: the scene sink, the scrolling track and the sprite view.
//!
//! Gameplay side (headless-safe):
//! - `SceneCommands` resource: the recording [`SceneSink`] the tick writes to.
//! - `Track` resource: ground ring that scrolls with the speed ramp.
//! - `Last`: clear unconsumed commands so a headless app does not accumulate them.
//!
//! Render side (`render_plugin`, requires DefaultPlugins):
//! - `PostUpdate`: drain `SceneCommands` into sprites, top-down view
//!   (world X → screen X, world -Z → screen Y).

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use bevy::window::WindowResized;

use crate::common::tunables::Tunables;

pub mod scene;
pub mod track;

pub use scene::{RenderHandle, RenderKind, SceneCommand, SceneCommands, SceneSink, Simulated, Tint};
pub use track::Track;

pub fn plugin(app: &mut App) {
    let track = Track::new(app.world().resource::<Tunables>());
    app.insert_resource(track)
        .init_resource::<SceneCommands>()
        .add_systems(Last, clear_scene_commands);
}

pub fn render_plugin(app: &mut App) {
    app.init_resource::<SceneEntities>()
        .add_systems(PostUpdate, (forward_viewport_resize, apply_scene_commands).chain());
}

fn clear_scene_commands(mut buffer: ResMut<SceneCommands>) {
    buffer.commands.clear();
}

// -----------------------------------------------------------------------------
// Presentation mapping (pure)
// -----------------------------------------------------------------------------

/// Health bar colour bands: green above half, yellow above a fifth, red below.
pub fn health_bar_color(fraction: f32) -> Color {
    if fraction > 0.5 {
        Color::srgb(0.0, 1.0, 0.0)
    } else if fraction > 0.2 {
        Color::srgb(1.0, 1.0, 0.0)
    } else {
        Color::srgb(1.0, 0.0, 0.0)
    }
}

fn tint_color(kind: RenderKind, tint: Tint) -> Color {
    match (kind, tint) {
        (_, Tint::Flash) => Color::WHITE,
        (RenderKind::Player, Tint::Base) => Color::srgb(0.0, 0.47, 1.0),
        (RenderKind::Enemy, Tint::Base) => Color::srgb(1.0, 0.55, 0.0),
        (RenderKind::Projectile, Tint::Base) => Color::srgb(1.0, 1.0, 0.0),
        (RenderKind::Ground, Tint::Base) => Color::srgb(0.27, 0.27, 0.27),
    }
}

fn sprite_size(kind: RenderKind, tunables: &Tunables) -> Vec2 {
    let ppm = tunables.pixels_per_meter;
    match kind {
        RenderKind::Player => Vec2::splat(0.8 * ppm),
        RenderKind::Enemy => Vec2::splat(tunables.enemy_half_extent * 2.0 * ppm),
        RenderKind::Projectile => Vec2::splat(tunables.projectile_half_extent * 2.0 * ppm),
        RenderKind::Ground => Vec2::new(
            tunables.lane_width * f32::from(tunables.lane_count) * 1.2 * ppm,
            tunables.ground_segment_length * ppm,
        ),
    }
}

/// Draw order per kind; ground at the back.
fn layer(kind: RenderKind) -> f32 {
    match kind {
        RenderKind::Ground => 0.0,
        RenderKind::Enemy => 1.0,
        RenderKind::Projectile => 2.0,
        RenderKind::Player => 3.0,
    }
}

/// Top-down projection of a world position.
pub fn to_screen(position: Vec3, kind: RenderKind, pixels_per_meter: f32) -> Vec3 {
    Vec3::new(
        position.x * pixels_per_meter,
        -position.z * pixels_per_meter,
        layer(kind),
    )
}

// -----------------------------------------------------------------------------
// Render side
// -----------------------------------------------------------------------------

/// Render handle → sprite entity.
#[derive(Resource, Debug, Default)]
pub struct SceneEntities {
    bodies: HashMap<RenderHandle, Entity>,
    bars: HashMap<RenderHandle, Entity>,
}

impl SceneEntities {
    #[inline]
    pub fn body(&self, handle: RenderHandle) -> Option<Entity> {
        self.bodies.get(&handle).copied()
    }
}

fn forward_viewport_resize(
    mut resized: MessageReader<WindowResized>,
    mut buffer: ResMut<SceneCommands>,
) {
    if let Some(ev) = resized.read().last() {
        buffer.on_viewport_resize(ev.width, ev.height);
    }
}

/// Drain recorded scene mutations into sprite entities.
///
/// Every write goes through `Commands` so that mutations recorded in the
/// same frame as the `Add` land on the freshly spawned entity.
fn apply_scene_commands(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut buffer: ResMut<SceneCommands>,
    mut entities: ResMut<SceneEntities>,
) {
    let ppm = tunables.pixels_per_meter;

    for cmd in buffer.commands.drain(..) {
        match cmd {
            SceneCommand::Add(handle) => {
                if entities.bodies.contains_key(&handle) {
                    continue;
                }
                let body = commands
                    .spawn((
                        Name::new(format!("{:?}({})", handle.kind, handle.index)),
                        Sprite::from_color(
                            tint_color(handle.kind, Tint::Base),
                            sprite_size(handle.kind, &tunables),
                        ),
                        Transform::from_translation(to_screen(Vec3::ZERO, handle.kind, ppm)),
                        Visibility::Hidden,
                    ))
                    .id();
                entities.bodies.insert(handle, body);

                if handle.kind == RenderKind::Enemy {
                    let bar = commands
                        .spawn((
                            Name::new(format!("HealthBar({})", handle.index)),
                            Sprite::from_color(
                                health_bar_color(1.0),
                                Vec2::new(tunables.health_bar_width, tunables.health_bar_height) * ppm,
                            ),
                            Transform::from_xyz(0.0, (tunables.enemy_half_extent + 0.3) * ppm, 0.5),
                            Visibility::Hidden,
                            ChildOf(body),
                        ))
                        .id();
                    entities.bars.insert(handle, bar);
                }
            }
            SceneCommand::Remove(handle) => {
                entities.bars.remove(&handle);
                if let Some(body) = entities.bodies.remove(&handle) {
                    commands.entity(body).despawn();
                }
            }
            SceneCommand::Transform {
                handle,
                position,
                scale,
            } => {
                let Some(body) = entities.body(handle) else { continue; };
                commands.entity(body).insert(
                    Transform::from_translation(to_screen(position, handle.kind, ppm))
                        .with_scale(Vec3::splat(scale)),
                );
            }
            SceneCommand::Visible { handle, visible } => {
                let Some(body) = entities.body(handle) else { continue; };
                commands.entity(body).insert(if visible {
                    Visibility::Inherited
                } else {
                    Visibility::Hidden
                });
            }
            SceneCommand::Tint { handle, tint } => {
                let Some(body) = entities.body(handle) else { continue; };
                commands.entity(body).insert(Sprite::from_color(
                    tint_color(handle.kind, tint),
                    sprite_size(handle.kind, &tunables),
                ));
            }
            SceneCommand::HealthBar {
                handle,
                fraction,
                visible,
            } => {
                let Some(&bar) = entities.bars.get(&handle) else { continue; };
                let width = tunables.health_bar_width * ppm;
                commands.entity(bar).insert((
                    Sprite::from_color(
                        health_bar_color(fraction),
                        Vec2::new(width, tunables.health_bar_height * ppm),
                    ),
                    Transform::from_xyz(
                        -width * (1.0 - fraction) * 0.5,
                        (tunables.enemy_half_extent + 0.3) * ppm,
                        0.5,
                    )
                    .with_scale(Vec3::new(fraction, 1.0, 1.0)),
                    if visible {
                        Visibility::Inherited
                    } else {
                        Visibility::Hidden
                    },
                ));
            }
        }
    }
}
