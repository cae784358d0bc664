//! Player plugin.
//!
//! Pipeline:
//! - Update: sample keys, write `LaneChange` / `ShootRequest` intents
//! - Update: apply intents to `PlayerController` (shots go to the projectile pool)
//! - FixedUpdate (game loop): `PlayerController::update` smooths toward the target lane
//!
//! State machine: `Alive -> Dead`, one-way. Only `reset` brings the player back.

use bevy::prelude::*;

use crate::common::lanes::{Lane, LaneDirection};
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::projectiles::ProjectileManager;
use crate::plugins::world::{RenderHandle, SceneSink, Simulated, Tint};

/// Per-tick lerp factors in `Tunables` are calibrated against this rate.
pub const REFERENCE_TICK_RATE: f32 = 60.0;

/// Muzzle position relative to the player body.
pub const MUZZLE_OFFSET: Vec3 = Vec3::new(0.0, 0.2, -0.5);

/// Down the track, away from the camera.
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Decoded lateral intent.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneChange(pub LaneDirection);

/// Decoded fire intent, stamped with the time it was issued.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ShootRequest {
    pub at: f64,
}

/// Where and which way to fire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireRequest {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Resource, Debug, Clone)]
pub struct PlayerController {
    lane: Lane,
    half_span: i8,
    lane_width: f32,
    target_x: f32,
    start: Vec3,
    position: Vec3,
    health: i32,
    max_health: i32,
    dead: bool,
    last_shot: Option<f64>,
    cooldown: f64,
    smoothing: f32,
    shown: bool,
}

impl PlayerController {
    pub fn new(tunables: &Tunables) -> Self {
        let start = Vec3::new(0.0, tunables.player_height, tunables.player_start_z);
        Self {
            lane: Lane::CENTRE,
            half_span: tunables.lane_half_span(),
            lane_width: tunables.lane_width,
            target_x: 0.0,
            start,
            position: start,
            health: tunables.player_max_health,
            max_health: tunables.player_max_health,
            dead: false,
            last_shot: None,
            cooldown: f64::from(tunables.projectile_cooldown),
            smoothing: tunables.lane_switch_smoothing,
            shown: false,
        }
    }

    pub fn handle_lane_input(&mut self, direction: LaneDirection) {
        if self.dead {
            return;
        }
        self.lane = self.lane.shifted(direction, self.half_span);
        self.target_x = self.lane.center_x(self.lane_width);
    }

    /// Returns a fire request unless dead or still cooling down.
    pub fn handle_shoot(&mut self, now: f64) -> Option<FireRequest> {
        if self.dead {
            return None;
        }
        if let Some(last) = self.last_shot {
            if now - last < self.cooldown {
                return None;
            }
        }
        self.last_shot = Some(now);

        Some(FireRequest {
            origin: self.position + MUZZLE_OFFSET,
            direction: FORWARD,
        })
    }

    /// Exponential approach toward the target lane.
    ///
    /// `alpha = 1 - (1 - k)^(dt * 60)`: one 60 Hz tick moves exactly `k` of the
    /// remaining gap, and the curve is the same at any tick rate.
    pub fn update(&mut self, dt: f32) {
        if self.dead {
            return;
        }
        let alpha = 1.0 - (1.0 - self.smoothing).powf(dt * REFERENCE_TICK_RATE);
        self.position.x += (self.target_x - self.position.x) * alpha;
    }

    /// Apply damage and return the resulting health fraction.
    pub fn take_damage(&mut self, amount: i32) -> f32 {
        if self.dead {
            return self.health_fraction();
        }
        self.health = (self.health - amount.max(0)).max(0);
        debug!("Player health: {}/{}", self.health, self.max_health);
        if self.health == 0 {
            self.die();
        }
        self.health_fraction()
    }

    fn die(&mut self) {
        if self.dead {
            return;
        }
        info!("Player died");
        self.dead = true;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[inline]
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    #[inline]
    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.max_health as f32
    }

    #[inline]
    pub fn lane(&self) -> Lane {
        self.lane
    }

    #[inline]
    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }
}

impl Simulated for PlayerController {
    fn register(&mut self, scene: &mut dyn SceneSink) {
        scene.add_entity(RenderHandle::PLAYER);
        scene.set_tint(RenderHandle::PLAYER, Tint::Base);
    }

    fn sync(&mut self, scene: &mut dyn SceneSink) {
        let visible = !self.dead;
        if visible {
            scene.set_transform(RenderHandle::PLAYER, self.position, 1.0);
        }
        if visible != self.shown {
            scene.set_visible(RenderHandle::PLAYER, visible);
            self.shown = visible;
        }
    }

    fn reset(&mut self) {
        self.health = self.max_health;
        self.dead = false;
        self.lane = Lane::CENTRE;
        self.target_x = 0.0;
        self.position = self.start;
        self.last_shot = None;
    }
}

pub fn plugin(app: &mut App) {
    let player = PlayerController::new(app.world().resource::<Tunables>());
    app.insert_resource(player)
        .add_message::<LaneChange>()
        .add_message::<ShootRequest>()
        .add_systems(
            Update,
            (gather_input, apply_lane_changes, apply_shoot_requests)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
}

/// Producer: translate keys into intents. No-op in headless apps without input.
fn gather_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    time: Res<Time>,
    mut lanes: MessageWriter<LaneChange>,
    mut shots: MessageWriter<ShootRequest>,
) {
    let Some(keys) = keys else { return; };

    if keys.any_just_pressed([KeyCode::ArrowLeft, KeyCode::KeyA]) {
        lanes.write(LaneChange(LaneDirection::Left));
    }
    if keys.any_just_pressed([KeyCode::ArrowRight, KeyCode::KeyD]) {
        lanes.write(LaneChange(LaneDirection::Right));
    }
    if keys.pressed(KeyCode::Space) {
        shots.write(ShootRequest {
            at: time.elapsed_secs_f64(),
        });
    }
}

fn apply_lane_changes(mut reader: MessageReader<LaneChange>, mut player: ResMut<PlayerController>) {
    for LaneChange(direction) in reader.read() {
        player.handle_lane_input(*direction);
    }
}

/// Consumer: cooldown gate on the player, then a pooled projectile.
fn apply_shoot_requests(
    mut reader: MessageReader<ShootRequest>,
    mut player: ResMut<PlayerController>,
    mut projectiles: ResMut<ProjectileManager>,
) {
    for req in reader.read() {
        if let Some(fire) = player.handle_shoot(req.at) {
            projectiles.fire_projectile(fire.origin, fire.direction);
        }
    }
}
