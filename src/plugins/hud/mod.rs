//! HUD plugin: score / health / game-over notifications.
//!
//! ```text
//! FixedUpdate: game loop -> PresentationSink (Messages<HudEvent>)
//! PostUpdate:  sync_hud_state reads HudEvent -> HudState resource
//! Update:      R / Enter while GameOver -> RestartRequest
//! ```
//!
//! The simulation only ever sees [`PresentationSink`]. Tests plug in a
//! `Vec<HudEvent>`; the app plugs in the Bevy message queue.

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::state::GameState;

/// Where the game loop reports run-level changes.
pub trait PresentationSink {
    fn on_score_changed(&mut self, score: i32);
    /// `fraction` of max health, in `[0, 1]`.
    fn on_health_changed(&mut self, fraction: f32);
    fn on_game_over(&mut self, reason: &str);
    /// A new run started; clears any game-over overlay.
    fn on_restart(&mut self);
}

#[derive(Message, Clone, Debug, PartialEq)]
pub enum HudEvent {
    ScoreChanged(i32),
    HealthChanged(f32),
    GameOver { reason: String },
    Restarted,
}

impl PresentationSink for Messages<HudEvent> {
    fn on_score_changed(&mut self, score: i32) {
        self.write(HudEvent::ScoreChanged(score));
    }

    fn on_health_changed(&mut self, fraction: f32) {
        self.write(HudEvent::HealthChanged(fraction));
    }

    fn on_game_over(&mut self, reason: &str) {
        self.write(HudEvent::GameOver {
            reason: reason.to_owned(),
        });
    }

    fn on_restart(&mut self) {
        self.write(HudEvent::Restarted);
    }
}

impl PresentationSink for Vec<HudEvent> {
    fn on_score_changed(&mut self, score: i32) {
        self.push(HudEvent::ScoreChanged(score));
    }

    fn on_health_changed(&mut self, fraction: f32) {
        self.push(HudEvent::HealthChanged(fraction));
    }

    fn on_game_over(&mut self, reason: &str) {
        self.push(HudEvent::GameOver {
            reason: reason.to_owned(),
        });
    }

    fn on_restart(&mut self) {
        self.push(HudEvent::Restarted);
    }
}

/// Latest values shown to the player.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct HudState {
    pub score: i32,
    pub health: f32,
    pub game_over: Option<String>,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            score: 0,
            health: 1.0,
            game_over: None,
        }
    }
}

impl HudState {
    pub fn apply(&mut self, event: &HudEvent) {
        match event {
            HudEvent::ScoreChanged(score) => self.score = *score,
            HudEvent::HealthChanged(fraction) => self.health = fraction.clamp(0.0, 1.0),
            HudEvent::GameOver { reason } => self.game_over = Some(reason.clone()),
            HudEvent::Restarted => *self = Self::default(),
        }
    }

    /// One-line summary, e.g. for a window title.
    pub fn caption(&self) -> String {
        let health = (self.health * 100.0).round() as i32;
        match &self.game_over {
            Some(reason) => format!(
                "Game Over! {reason} | Final score: {} | R to restart",
                self.score
            ),
            None => format!("Score: {} | Health: {health}%", self.score),
        }
    }
}

/// Decoded "start a new run" intent.
#[derive(Message, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestartRequest;

pub fn plugin(app: &mut App) {
    app.add_message::<HudEvent>()
        .add_message::<RestartRequest>()
        .init_resource::<HudState>()
        .add_systems(
            Update,
            gather_restart_input.run_if(in_state(GameState::GameOver)),
        )
        .add_systems(PostUpdate, sync_hud_state);
}

/// Render side: mirror the HUD into the primary window title.
pub fn render_plugin(app: &mut App) {
    app.add_systems(PostUpdate, show_in_window_title.after(sync_hud_state));
}

fn gather_restart_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut restarts: MessageWriter<RestartRequest>,
) {
    let Some(keys) = keys else { return; };
    if keys.any_just_pressed([KeyCode::KeyR, KeyCode::Enter]) {
        restarts.write(RestartRequest);
    }
}

fn sync_hud_state(mut events: MessageReader<HudEvent>, mut hud: ResMut<HudState>) {
    for event in events.read() {
        match event {
            HudEvent::GameOver { reason } => info!("Game over: {reason} (score {})", hud.score),
            HudEvent::Restarted => info!("New run"),
            _ => {}
        }
        hud.apply(event);
    }
}

fn show_in_window_title(hud: Res<HudState>, mut windows: Query<&mut Window>) {
    if !hud.is_changed() {
        return;
    }
    let caption = hud.caption();
    for mut window in &mut windows {
        window.title = caption.clone();
    }
}
