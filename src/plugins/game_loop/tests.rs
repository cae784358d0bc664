use bevy::prelude::*;

use crate::common::test_utils::quiet_tunables;
use crate::plugins::enemies::EnemyId;
use crate::plugins::hud::HudEvent;
use crate::plugins::player::FORWARD;
use crate::plugins::world::SceneCommand;

use super::*;

/// Plain-struct stand-in for the Bevy resources a tick borrows.
struct Rig {
    game_loop: GameLoop,
    player: PlayerController,
    enemies: EnemyManager,
    projectiles: ProjectileManager,
    track: Track,
    scene: SceneCommands,
    hud: Vec<HudEvent>,
}

impl Rig {
    fn new(t: &Tunables) -> Self {
        Self {
            game_loop: GameLoop::new(t),
            player: PlayerController::new(t),
            enemies: EnemyManager::new(t),
            projectiles: ProjectileManager::new(t),
            track: Track::new(t),
            scene: SceneCommands::default(),
            hud: Vec::new(),
        }
    }

    fn started(t: &Tunables) -> Self {
        let mut rig = Self::new(t);
        rig.game_loop.start();
        rig
    }

    fn tick(&mut self, now: f64) -> TickStatus {
        let mut ctx = TickContext {
            player: &mut self.player,
            enemies: &mut self.enemies,
            projectiles: &mut self.projectiles,
            track: &mut self.track,
            scene: &mut self.scene,
            hud: &mut self.hud,
        };
        self.game_loop.tick(now, &mut ctx)
    }

    fn restart(&mut self) {
        let mut ctx = TickContext {
            player: &mut self.player,
            enemies: &mut self.enemies,
            projectiles: &mut self.projectiles,
            track: &mut self.track,
            scene: &mut self.scene,
            hud: &mut self.hud,
        };
        self.game_loop.restart(&mut ctx);
    }

    fn game_over_events(&self) -> usize {
        self.hud
            .iter()
            .filter(|e| matches!(e, HudEvent::GameOver { .. }))
            .count()
    }
}

fn lethal_contact() -> Tunables {
    Tunables {
        enemy_contact_damage: 100,
        ..quiet_tunables()
    }
}

// -----------------------------------------------------------------------------
// Timing
// -----------------------------------------------------------------------------

#[test]
fn first_tick_after_start_has_zero_dt() {
    let mut rig = Rig::started(&quiet_tunables());

    rig.tick(5.0);
    assert_eq!(rig.game_loop.run_time(), 0.0);

    rig.tick(5.5);
    assert_eq!(rig.game_loop.run_time(), 0.5);
    assert_eq!(rig.game_loop.ticks(), 2);
}

#[test]
fn stopped_loop_does_not_tick() {
    let mut rig = Rig::new(&quiet_tunables());
    assert_eq!(rig.tick(1.0), TickStatus::Halted);
    assert_eq!(rig.game_loop.ticks(), 0);
    assert_eq!(rig.scene.frames_rendered, 0);
}

#[test]
fn start_on_running_loop_restarts_timing() {
    let mut rig = Rig::started(&quiet_tunables());
    rig.tick(1.0);
    rig.tick(1.5);

    rig.game_loop.start();
    rig.tick(10.0);

    assert_eq!(rig.game_loop.run_time(), 0.5);
    assert!(rig.game_loop.is_running());
}

#[test]
fn stop_is_idempotent_and_reset_clears_timing() {
    let mut rig = Rig::started(&quiet_tunables());
    rig.tick(0.0);
    rig.tick(2.0);

    rig.game_loop.stop();
    rig.game_loop.stop();
    assert_eq!(rig.game_loop.state(), LoopState::Stopped);

    rig.game_loop.reset();
    assert_eq!(rig.game_loop.run_time(), 0.0);
}

#[test]
fn every_tick_renders_once() {
    let mut rig = Rig::started(&quiet_tunables());
    for i in 0..4 {
        rig.tick(f64::from(i) * 0.1);
    }
    assert_eq!(rig.scene.frames_rendered, 4);
}

#[test]
fn track_scrolls_at_ramped_speed() {
    let t = quiet_tunables();
    let mut rig = Rig::started(&t);
    rig.tick(0.0);
    rig.tick(1.0);

    let expected = t.ramped_speed(1.0);
    assert!((rig.track.distance() - expected).abs() < 1e-4);
}

// -----------------------------------------------------------------------------
// Score, damage, game over
// -----------------------------------------------------------------------------

#[test]
fn reach_penalty_never_drives_score_negative() {
    let t = quiet_tunables();
    let mut rig = Rig::started(&t);
    rig.enemies.spawn_enemy();

    rig.tick(0.0);
    rig.tick(7.0);

    assert_eq!(rig.game_loop.score(), 0);
    assert_eq!(rig.player.health(), t.player_max_health - t.enemy_contact_damage);
    assert!(rig.hud.contains(&HudEvent::HealthChanged(0.8)));
    assert!(rig.game_loop.is_running());
}

#[test]
fn contact_damage_is_applied_once_per_reach() {
    let t = quiet_tunables();
    let mut rig = Rig::started(&t);
    rig.enemies.spawn_enemy();

    rig.tick(0.0);
    rig.tick(7.0);
    rig.tick(7.1);
    rig.tick(7.2);

    assert_eq!(rig.player.health(), 80);
}

#[test]
fn kill_adds_score_and_notifies() {
    let t = Tunables {
        projectile_damage: 30,
        ..quiet_tunables()
    };
    let mut rig = Rig::started(&t);
    let enemy = rig.enemies.spawn_enemy().unwrap();
    let origin = rig.enemies.enemy(enemy).unwrap().position() + Vec3::new(0.0, 0.0, 0.3);
    rig.projectiles.fire_projectile(origin, FORWARD);

    rig.tick(0.0);
    rig.tick(0.01);

    assert_eq!(rig.game_loop.score(), t.enemy_score_value);
    assert!(rig.hud.contains(&HudEvent::ScoreChanged(t.enemy_score_value)));
}

#[test]
fn enemy_spawned_this_tick_can_be_shot_this_tick() {
    let t = Tunables {
        lane_count: 1,
        spawn_interval_min: 0.01,
        spawn_interval_max: 0.01,
        ..quiet_tunables()
    };
    let mut rig = Rig::started(&t);
    rig.tick(0.0);
    assert_eq!(rig.enemies.active_count(), 0);

    // Both close the gap during the next tick: the enemy spawns then moves,
    // the projectile flies back onto it.
    let dt = 0.1;
    let meet_z = t.enemy_spawn_z() + t.ramped_speed(dt) * dt;
    let origin = Vec3::new(0.0, t.enemy_base_y, meet_z + t.projectile_speed * dt);
    rig.projectiles.fire_projectile(origin, FORWARD);

    rig.tick(f64::from(dt));

    assert_eq!(rig.enemies.active_count(), 1);
    let enemy = rig.enemies.enemy(EnemyId(0)).unwrap();
    assert!(!enemy.is_dying());
    assert_eq!(enemy.health(), t.enemy_max_health - t.projectile_damage);
    assert_eq!(rig.projectiles.active_count(), 0);
}

#[test]
fn lethal_contact_ends_the_run_exactly_once() {
    let mut rig = Rig::started(&lethal_contact());
    rig.enemies.spawn_enemy();

    assert_eq!(rig.tick(0.0), TickStatus::Continue);
    assert_eq!(rig.tick(7.0), TickStatus::Halted);

    assert!(rig.player.is_dead());
    assert!(rig.game_loop.is_game_over());
    assert!(!rig.game_loop.is_running());
    assert_eq!(rig.game_over_events(), 1);
    assert!(rig.hud.contains(&HudEvent::GameOver {
        reason: GAME_OVER_REASON.into()
    }));

    // Further ticks are dropped.
    assert_eq!(rig.tick(8.0), TickStatus::Halted);
    assert_eq!(rig.game_over_events(), 1);
}

#[test]
fn two_simultaneous_reaches_only_kill_once() {
    let t = Tunables {
        lane_count: 1,
        ..lethal_contact()
    };
    let mut rig = Rig::started(&t);
    rig.enemies.spawn_enemy();
    rig.enemies.spawn_enemy();

    rig.tick(0.0);
    rig.tick(7.0);

    assert_eq!(rig.player.health(), 0);
    assert_eq!(rig.game_over_events(), 1);
}

// -----------------------------------------------------------------------------
// Setup and restart
// -----------------------------------------------------------------------------

#[test]
fn setup_registers_every_renderable_and_publishes_hud() {
    let t = quiet_tunables();
    let mut rig = Rig::new(&t);
    let mut ctx = TickContext {
        player: &mut rig.player,
        enemies: &mut rig.enemies,
        projectiles: &mut rig.projectiles,
        track: &mut rig.track,
        scene: &mut rig.scene,
        hud: &mut rig.hud,
    };
    rig.game_loop.setup(&mut ctx);

    let adds = rig
        .scene
        .commands
        .iter()
        .filter(|c| matches!(c, SceneCommand::Add(_)))
        .count();
    assert_eq!(
        adds,
        1 + t.enemy_pool_size + t.projectile_pool_size + t.ground_segments as usize
    );
    assert_eq!(
        rig.hud,
        vec![HudEvent::ScoreChanged(0), HudEvent::HealthChanged(1.0)]
    );
}

#[test]
fn restart_after_game_over_starts_a_fresh_run() {
    let mut rig = Rig::started(&lethal_contact());
    rig.enemies.spawn_enemy();
    rig.projectiles.fire_projectile(Vec3::ZERO, FORWARD);
    rig.tick(0.0);
    rig.tick(7.0);
    assert!(rig.game_loop.is_game_over());

    rig.hud.clear();
    rig.restart();

    assert!(rig.game_loop.is_running());
    assert!(!rig.game_loop.is_game_over());
    assert_eq!(rig.game_loop.score(), 0);
    assert_eq!(rig.game_loop.run_time(), 0.0);
    assert!(!rig.player.is_dead());
    assert_eq!(rig.player.health_fraction(), 1.0);
    assert_eq!(rig.enemies.active_count(), 0);
    assert_eq!(rig.projectiles.active_count(), 0);
    assert_eq!(rig.track.distance(), 0.0);
    assert_eq!(
        rig.hud,
        vec![
            HudEvent::Restarted,
            HudEvent::ScoreChanged(0),
            HudEvent::HealthChanged(1.0)
        ]
    );

    assert_eq!(rig.tick(20.0), TickStatus::Continue);
    assert_eq!(rig.tick(20.1), TickStatus::Continue);
    assert_eq!(rig.game_loop.ticks(), 2);
}
