//! Enemies plugin: pooled runners that come down the lanes toward the player.
//!
//! ---------------------------
//! LIFE CYCLE (per pool slot)
//! ---------------------------
//! ```text
//!   Free --spawn--> Active --lethal hit / reached player--> Dying --shrunk--> Free
//!                     |                                                     ^
//!                     +------------------- passed the camera ---------------+
//! ```
//! - `Dying` is a variant of the life state, so "dying but inactive" cannot be
//!   represented at all.
//! - Health is frozen while dying: `take_damage` only accepts `Active` enemies.
//!
//! ---------------------------
//! PER-TICK ORDER
//! ---------------------------
//! 1) spawn schedule (at most one spawn per tick)
//! 2) every active slot in pool order: shrink if dying, otherwise flash decay,
//!    advance along +Z at the ramped speed, then reach / out-of-view checks
//! 3) return the summed score / damage for the game loop to apply once
//!
//! Reaching the player is not a kill: it costs the player health and the run a
//! score penalty, and the enemy plays the same shrink effect on its way out.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::common::bounds::{cube_around, empty_at};
use crate::common::lanes::Lane;
use crate::common::pool::{Pool, Poolable};
use crate::common::tunables::Tunables;
use crate::plugins::world::{RenderHandle, SceneSink, Simulated, Tint};

/// Index of an enemy slot; stable for the life of the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemyId(pub usize);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum EnemyLifeState {
    #[default]
    Free,
    Active,
    Dying {
        timer: f32,
    },
}

#[derive(Debug, Clone)]
pub struct Enemy {
    life: EnemyLifeState,
    lane: Lane,
    position: Vec3,
    bounds: Aabb3d,
    health: i32,
    max_health: i32,
    hit_flash_timer: f32,
    scale: f32,
    tint: Tint,
    shown: bool,
    shown_tint: Tint,
    /// Last health bar sent to the scene: `(fraction, visible)`.
    shown_bar: (f32, bool),
}

impl Poolable for Enemy {
    #[inline]
    fn is_active(&self) -> bool {
        !matches!(self.life, EnemyLifeState::Free)
    }
}

impl Enemy {
    fn inert(max_health: i32) -> Self {
        Self {
            life: EnemyLifeState::Free,
            lane: Lane::CENTRE,
            position: Vec3::ZERO,
            bounds: empty_at(Vec3::ZERO),
            health: max_health,
            max_health,
            hit_flash_timer: 0.0,
            scale: 1.0,
            tint: Tint::Base,
            shown: false,
            shown_tint: Tint::Base,
            // Matches the hidden, full bar the renderer spawns.
            shown_bar: (1.0, false),
        }
    }

    /// Return to `Free`, restoring every presentation value.
    fn deactivate(&mut self) {
        self.life = EnemyLifeState::Free;
        self.hit_flash_timer = 0.0;
        self.scale = 1.0;
        self.tint = Tint::Base;
    }

    /// `Active -> Dying`. Anything else is left alone.
    fn start_dying(&mut self, duration: f32) -> bool {
        if self.life != EnemyLifeState::Active {
            return false;
        }
        self.life = EnemyLifeState::Dying { timer: duration };
        true
    }

    #[inline]
    pub fn life(&self) -> EnemyLifeState {
        self.life
    }

    #[inline]
    pub fn is_dying(&self) -> bool {
        matches!(self.life, EnemyLifeState::Dying { .. })
    }

    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[inline]
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Health bar fill, clamped to `[0, 1]`.
    #[inline]
    pub fn health_fraction(&self) -> f32 {
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn lane(&self) -> Lane {
        self.lane
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn bounds(&self) -> Aabb3d {
        self.bounds
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn tint(&self) -> Tint {
        self.tint
    }
}

/// Result of a single `take_damage` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    pub killed: bool,
    pub score_value: i32,
}

/// Summed effect of one enemy pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnemyTick {
    pub score_delta: i32,
    pub damage_to_player: i32,
}

/// Shootable enemy as seen by the projectile pass.
#[derive(Clone, Copy, Debug)]
pub struct EnemyTarget {
    pub id: EnemyId,
    pub bounds: Aabb3d,
}

#[derive(Resource, Debug)]
pub struct EnemyManager {
    pool: Pool<Enemy>,
    settings: Tunables,
    rng: ChaCha8Rng,
    spawn_timer: f32,
    next_spawn_interval: f32,
}

impl EnemyManager {
    pub fn new(tunables: &Tunables) -> Self {
        let rng = match tunables.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let max_health = tunables.enemy_max_health;
        let mut manager = Self {
            pool: Pool::new("enemy", tunables.enemy_pool_size, |_| Enemy::inert(max_health)),
            settings: tunables.clone(),
            rng,
            spawn_timer: 0.0,
            next_spawn_interval: 0.0,
        };
        manager.draw_next_interval();
        manager
    }

    fn draw_next_interval(&mut self) {
        self.next_spawn_interval = self
            .rng
            .gen_range(self.settings.spawn_interval_min..=self.settings.spawn_interval_max);
    }

    #[inline]
    pub fn next_spawn_interval(&self) -> f32 {
        self.next_spawn_interval
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Active slots, dying ones included.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    #[inline]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.pool.get(id.0)
    }

    /// Activate the first free slot in a random lane. Drops the spawn when full.
    pub fn spawn_enemy(&mut self) -> Option<EnemyId> {
        let (index, enemy) = match self.pool.acquire() {
            Ok(slot) => slot,
            Err(e) => {
                warn!("{e}; enemy spawn dropped");
                return None;
            }
        };

        let half = self.settings.lane_half_span();
        let lane = Lane::new_clamped(self.rng.gen_range(-half..=half), half);
        let position = Vec3::new(
            lane.center_x(self.settings.lane_width),
            self.settings.enemy_base_y,
            self.settings.enemy_spawn_z(),
        );

        enemy.life = EnemyLifeState::Active;
        enemy.lane = lane;
        enemy.position = position;
        enemy.bounds = cube_around(position, self.settings.enemy_half_extent);
        enemy.health = enemy.max_health;
        enemy.hit_flash_timer = 0.0;
        enemy.scale = 1.0;
        enemy.tint = Tint::Base;

        debug!("Enemy {index} spawned in lane {}", lane.index());
        Some(EnemyId(index))
    }

    /// Advance the spawn schedule and every active enemy by `dt`.
    pub fn update(&mut self, dt: f32, run_time: f32, player_z: f32) -> EnemyTick {
        self.spawn_timer += dt;
        if self.spawn_timer >= self.next_spawn_interval {
            self.spawn_enemy();
            self.spawn_timer = 0.0;
            self.draw_next_interval();
        }

        let settings = &self.settings;
        let speed = settings.ramped_speed(run_time);
        let reach_z = player_z - settings.reach_margin;
        let behind_z = settings.behind_camera_z();
        let mut tick = EnemyTick::default();

        for (index, enemy) in self.pool.iter_active_mut() {
            if let EnemyLifeState::Dying { timer } = &mut enemy.life {
                *timer -= dt;
                enemy.scale = (*timer / settings.death_shrink_duration).max(0.0);
                if *timer <= 0.0 {
                    enemy.deactivate();
                }
                continue;
            }

            if enemy.hit_flash_timer > 0.0 {
                enemy.hit_flash_timer -= dt;
                if enemy.hit_flash_timer <= 0.0 {
                    enemy.hit_flash_timer = 0.0;
                    enemy.tint = Tint::Base;
                }
            }

            enemy.position.z += speed * dt;
            enemy.bounds = cube_around(enemy.position, settings.enemy_half_extent);

            if enemy.position.z > reach_z {
                debug!("Enemy {index} reached the player");
                tick.damage_to_player += settings.enemy_contact_damage;
                tick.score_delta -= settings.reach_penalty;
                enemy.start_dying(settings.death_shrink_duration);
            } else if enemy.position.z > behind_z {
                enemy.deactivate();
            }
        }

        tick
    }

    /// Apply `amount` to an active, non-dying enemy.
    pub fn take_damage(&mut self, id: EnemyId, amount: i32) -> DamageOutcome {
        let Some(enemy) = self.pool.get_mut(id.0) else {
            return DamageOutcome::default();
        };
        if enemy.life != EnemyLifeState::Active {
            return DamageOutcome::default();
        }

        enemy.health -= amount;
        enemy.tint = Tint::Flash;
        enemy.hit_flash_timer = self.settings.hit_flash_duration;

        if enemy.health <= 0 {
            enemy.start_dying(self.settings.death_shrink_duration);
            return DamageOutcome {
                killed: true,
                score_value: self.settings.enemy_score_value,
            };
        }
        DamageOutcome::default()
    }

    /// Idempotent: inactive or already dying enemies are left alone.
    pub fn start_death_effect(&mut self, id: EnemyId) {
        let duration = self.settings.death_shrink_duration;
        if let Some(enemy) = self.pool.get_mut(id.0) {
            enemy.start_dying(duration);
        }
    }

    /// Active, non-dying enemies in pool order. Reuses `out`.
    pub fn collect_targets(&self, out: &mut Vec<EnemyTarget>) {
        out.clear();
        out.extend(
            self.pool
                .iter()
                .enumerate()
                .filter(|(_, e)| e.life == EnemyLifeState::Active)
                .map(|(i, e)| EnemyTarget {
                    id: EnemyId(i),
                    bounds: e.bounds,
                }),
        );
    }
}

impl Simulated for EnemyManager {
    fn register(&mut self, scene: &mut dyn SceneSink) {
        for i in 0..self.pool.capacity() {
            scene.add_entity(RenderHandle::enemy(i));
        }
    }

    fn sync(&mut self, scene: &mut dyn SceneSink) {
        for (i, enemy) in self.pool.iter_mut().enumerate() {
            let handle = RenderHandle::enemy(i);
            let visible = enemy.is_active();
            if visible {
                scene.set_transform(handle, enemy.position, enemy.scale);
                if enemy.tint != enemy.shown_tint {
                    scene.set_tint(handle, enemy.tint);
                    enemy.shown_tint = enemy.tint;
                }
            }

            let bar = (enemy.health_fraction(), visible && !enemy.is_dying());
            if enemy.shown_bar != bar {
                scene.set_health_bar(handle, bar.0, bar.1);
                enemy.shown_bar = bar;
            }

            if visible != enemy.shown {
                scene.set_visible(handle, visible);
                enemy.shown = visible;
            }
        }
    }

    fn reset(&mut self) {
        for enemy in self.pool.iter_mut() {
            if enemy.is_active() {
                enemy.deactivate();
            }
        }
        self.spawn_timer = 0.0;
        self.draw_next_interval();
    }
}

pub fn plugin(app: &mut App) {
    let enemies = EnemyManager::new(app.world().resource::<Tunables>());
    app.insert_resource(enemies);
}
