//! Game loop plugin: one deterministic tick per `FixedUpdate`.
//!
//! ```text
//! tick(now):
//!   dt = now - last_tick (0 on the first tick after start)
//!   1) player.update(dt)
//!   2) enemies.update(dt, run_time, player_z)  -> score / contact damage
//!   3) projectiles.update(dt, enemies)         -> kill score
//!   4) track.advance(dt, ramped speed)
//!   5) sync every participant, scene.render()
//!   6) game over -> stop, GameState::GameOver
//! ```
//!
//! Managers return summed deltas; the loop is the only place that touches the
//! score and routes damage to the player, so each effect is applied once.

use bevy::ecs::message::Messages;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::enemies::EnemyManager;
use crate::plugins::hud::{HudEvent, PresentationSink, RestartRequest};
use crate::plugins::player::PlayerController;
use crate::plugins::projectiles::ProjectileManager;
use crate::plugins::world::{SceneCommands, SceneSink, Simulated, Track};

pub const GAME_OVER_REASON: &str = "Player defeated!";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    Continue,
    Halted,
}

/// Everything one tick reads or writes, borrowed for the duration of the tick.
pub struct TickContext<'a> {
    pub player: &'a mut PlayerController,
    pub enemies: &'a mut EnemyManager,
    pub projectiles: &'a mut ProjectileManager,
    pub track: &'a mut Track,
    pub scene: &'a mut dyn SceneSink,
    pub hud: &'a mut dyn PresentationSink,
}

impl TickContext<'_> {
    fn register(&mut self) {
        self.player.register(self.scene);
        self.enemies.register(self.scene);
        self.projectiles.register(self.scene);
        self.track.register(self.scene);
    }

    fn sync(&mut self) {
        self.player.sync(self.scene);
        self.enemies.sync(self.scene);
        self.projectiles.sync(self.scene);
        self.track.sync(self.scene);
    }

    fn reset(&mut self) {
        self.player.reset();
        self.enemies.reset();
        self.projectiles.reset();
        self.track.reset();
    }
}

#[derive(Resource, Debug)]
pub struct GameLoop {
    state: LoopState,
    last_tick: Option<f64>,
    run_time: f32,
    score: i32,
    game_over: bool,
    ticks: u64,
    settings: Tunables,
}

impl GameLoop {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            state: LoopState::Stopped,
            last_tick: None,
            run_time: 0.0,
            score: 0,
            game_over: false,
            ticks: 0,
            settings: tunables.clone(),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn score(&self) -> i32 {
        self.score
    }

    #[inline]
    pub fn run_time(&self) -> f32 {
        self.run_time
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Ticks executed since the last restart.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Announce every renderable and publish the opening HUD values.
    pub fn setup(&mut self, ctx: &mut TickContext<'_>) {
        ctx.register();
        ctx.sync();
        ctx.hud.on_score_changed(self.score);
        ctx.hud.on_health_changed(ctx.player.health_fraction());
    }

    /// Begin (or re-begin) ticking. The next tick sees `dt = 0`.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Game loop already running; restarting timing");
        } else {
            info!("Game loop started");
        }
        self.state = LoopState::Running;
        self.last_tick = None;
    }

    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        info!("Game loop stopped after {} ticks", self.ticks);
        self.state = LoopState::Stopped;
    }

    /// Stop and clear timing. Score and game-over flag survive until `restart`.
    pub fn reset(&mut self) {
        self.stop();
        self.last_tick = None;
        self.run_time = 0.0;
    }

    /// Fresh run: every participant reset, score zeroed, loop running.
    pub fn restart(&mut self, ctx: &mut TickContext<'_>) {
        self.reset();
        ctx.reset();
        self.score = 0;
        self.game_over = false;
        self.ticks = 0;

        ctx.hud.on_restart();
        ctx.hud.on_score_changed(self.score);
        ctx.hud.on_health_changed(ctx.player.health_fraction());
        ctx.sync();

        self.start();
    }

    /// Advance the simulation to `now` (seconds).
    pub fn tick(&mut self, now: f64, ctx: &mut TickContext<'_>) -> TickStatus {
        if !self.is_running() {
            return TickStatus::Halted;
        }

        let dt = match self.last_tick {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.run_time += dt;
        self.ticks += 1;

        ctx.player.update(dt);

        let enemy_tick = ctx.enemies.update(dt, self.run_time, ctx.player.position().z);
        self.add_score(enemy_tick.score_delta, ctx.hud);
        if enemy_tick.damage_to_player > 0 && !ctx.player.is_dead() {
            let fraction = ctx.player.take_damage(enemy_tick.damage_to_player);
            ctx.hud.on_health_changed(fraction);
            if ctx.player.is_dead() {
                self.trigger_game_over(ctx.hud);
            }
        }

        let projectile_tick = ctx.projectiles.update(dt, ctx.enemies);
        self.add_score(projectile_tick.score_delta, ctx.hud);

        ctx.track.advance(dt, self.settings.ramped_speed(self.run_time));

        ctx.sync();
        ctx.scene.render();

        if self.game_over {
            self.stop();
            return TickStatus::Halted;
        }
        TickStatus::Continue
    }

    /// Score never drops below zero.
    fn add_score(&mut self, delta: i32, hud: &mut dyn PresentationSink) {
        if delta == 0 {
            return;
        }
        self.score = (self.score + delta).max(0);
        hud.on_score_changed(self.score);
    }

    fn trigger_game_over(&mut self, hud: &mut dyn PresentationSink) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        info!("{GAME_OVER_REASON} Final score: {}", self.score);
        hud.on_game_over(GAME_OVER_REASON);
    }
}

pub fn plugin(app: &mut App) {
    let game_loop = GameLoop::new(app.world().resource::<Tunables>());
    app.insert_resource(game_loop)
        .add_systems(Startup, start_run)
        .add_systems(FixedUpdate, run_tick.run_if(loop_is_running))
        .add_systems(
            Update,
            apply_restart_requests.run_if(in_state(GameState::GameOver)),
        );
}

/// Run condition: the stop flag, checked before every tick.
pub fn loop_is_running(game_loop: Res<GameLoop>) -> bool {
    game_loop.is_running()
}

/// The resources a tick borrows, fetched together.
#[derive(SystemParam)]
pub struct Participants<'w> {
    player: ResMut<'w, PlayerController>,
    enemies: ResMut<'w, EnemyManager>,
    projectiles: ResMut<'w, ProjectileManager>,
    track: ResMut<'w, Track>,
    scene: ResMut<'w, SceneCommands>,
    hud: ResMut<'w, Messages<HudEvent>>,
}

impl Participants<'_> {
    pub fn context(&mut self) -> TickContext<'_> {
        TickContext {
            player: &mut *self.player,
            enemies: &mut *self.enemies,
            projectiles: &mut *self.projectiles,
            track: &mut *self.track,
            scene: &mut *self.scene,
            hud: &mut *self.hud,
        }
    }
}

fn start_run(mut game_loop: ResMut<GameLoop>, mut participants: Participants) {
    game_loop.setup(&mut participants.context());
    game_loop.start();
}

fn run_tick(
    time: Res<Time>,
    mut game_loop: ResMut<GameLoop>,
    mut next_state: ResMut<NextState<GameState>>,
    mut participants: Participants,
) {
    let status = game_loop.tick(time.elapsed_secs_f64(), &mut participants.context());
    if status == TickStatus::Halted {
        next_state.set(GameState::GameOver);
    }
}

fn apply_restart_requests(
    mut requests: MessageReader<RestartRequest>,
    mut game_loop: ResMut<GameLoop>,
    mut next_state: ResMut<NextState<GameState>>,
    mut participants: Participants,
) {
    if requests.read().count() == 0 {
        return;
    }
    game_loop.restart(&mut participants.context());
    next_state.set(GameState::Playing);
}

#[cfg(test)]
mod tests;
