//! Projectiles plugin: pooled shots flying down the track.
//!
//! # Data flow
//! ```text
//!   Update (variable dt)
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  player::apply_shoot_requests                                        │
//! │    - cooldown gate on PlayerController                               │
//! │    - ProjectileManager::fire_projectile (first free slot)            │
//! └──────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   FixedUpdate (game loop tick, after the enemy pass)
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  ProjectileManager::update                                           │
//! │    - snapshot shootable enemies once (reused scratch Vec)            │
//! │    - per active projectile: move, refresh AABB, first hit wins       │
//! │    - hit: damage enemy, release projectile, sum kill score           │
//! │    - out of bounds (past far end / behind camera): release           │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Where do we still branch?
//! - Capacity: pool can be full, so the shot is dropped with a warning.
//! - Aim: a zero direction falls back to straight down the track.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

use crate::common::bounds::{cube_around, empty_at, overlaps};
use crate::common::pool::{Pool, Poolable};
use crate::common::tunables::Tunables;
use crate::plugins::enemies::{EnemyManager, EnemyTarget};
use crate::plugins::player::FORWARD;
use crate::plugins::world::{RenderHandle, SceneSink, Simulated};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileId(pub usize);

#[derive(Debug, Clone)]
pub struct Projectile {
    active: bool,
    position: Vec3,
    velocity: Vec3,
    bounds: Aabb3d,
    shown: bool,
}

impl Poolable for Projectile {
    #[inline]
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Projectile {
    fn inert() -> Self {
        Self {
            active: false,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            bounds: empty_at(Vec3::ZERO),
            shown: false,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

/// Summed effect of one projectile pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectileTick {
    pub score_delta: i32,
    pub hits: u32,
}

#[derive(Resource, Debug)]
pub struct ProjectileManager {
    pool: Pool<Projectile>,
    targets: Vec<EnemyTarget>,
    speed: f32,
    damage: i32,
    half_extent: f32,
    far_z: f32,
    behind_z: f32,
}

impl ProjectileManager {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            pool: Pool::new("projectile", tunables.projectile_pool_size, |_| {
                Projectile::inert()
            }),
            targets: Vec::with_capacity(tunables.enemy_pool_size),
            speed: tunables.projectile_speed,
            damage: tunables.projectile_damage,
            half_extent: tunables.projectile_half_extent,
            far_z: tunables.far_z(),
            behind_z: tunables.behind_camera_z(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    #[inline]
    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.pool.get(id.0)
    }

    /// Launch from the first free slot. `direction` is normalized here.
    pub fn fire_projectile(&mut self, origin: Vec3, direction: Vec3) -> Option<ProjectileId> {
        let (index, projectile) = match self.pool.acquire() {
            Ok(slot) => slot,
            Err(e) => {
                warn!("{e}; shot dropped");
                return None;
            }
        };

        let direction = direction.try_normalize().unwrap_or(FORWARD);
        projectile.active = true;
        projectile.position = origin;
        projectile.velocity = direction * self.speed;
        projectile.bounds = cube_around(origin, self.half_extent);

        Some(ProjectileId(index))
    }

    /// Move every active projectile and resolve hits against `enemies`.
    ///
    /// Targets are snapshotted once per pass; each projectile hits at most one
    /// enemy, the first overlapping one in pool order.
    pub fn update(&mut self, dt: f32, enemies: &mut EnemyManager) -> ProjectileTick {
        enemies.collect_targets(&mut self.targets);
        let mut tick = ProjectileTick::default();

        for (_, projectile) in self.pool.iter_active_mut() {
            projectile.position += projectile.velocity * dt;
            projectile.bounds = cube_around(projectile.position, self.half_extent);

            let hit = self
                .targets
                .iter()
                .find(|t| overlaps(&projectile.bounds, &t.bounds))
                .map(|t| t.id);

            if let Some(id) = hit {
                let outcome = enemies.take_damage(id, self.damage);
                tick.hits += 1;
                if outcome.killed {
                    tick.score_delta += outcome.score_value;
                }
                projectile.active = false;
                continue;
            }

            let z = projectile.position.z;
            if z < self.far_z || z > self.behind_z {
                projectile.active = false;
            }
        }

        tick
    }
}

impl Simulated for ProjectileManager {
    fn register(&mut self, scene: &mut dyn SceneSink) {
        for i in 0..self.pool.capacity() {
            scene.add_entity(RenderHandle::projectile(i));
        }
    }

    fn sync(&mut self, scene: &mut dyn SceneSink) {
        for (i, projectile) in self.pool.iter_mut().enumerate() {
            let handle = RenderHandle::projectile(i);
            if projectile.active {
                scene.set_transform(handle, projectile.position, 1.0);
            }
            if projectile.active != projectile.shown {
                scene.set_visible(handle, projectile.active);
                projectile.shown = projectile.active;
            }
        }
    }

    fn reset(&mut self) {
        for projectile in self.pool.iter_mut() {
            projectile.active = false;
        }
        self.targets.clear();
    }
}

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        let projectiles = ProjectileManager::new(app.world().resource::<Tunables>());
        app.insert_resource(projectiles);
    }
}
