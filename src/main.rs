use std::path::PathBuf;
use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;

use lane_runner::common::error::ConfigError;
use lane_runner::common::tunables::Tunables;
use lane_runner::game;
use lane_runner::plugins::game_loop::GameLoop;
use lane_runner::plugins::hud::HudState;

/// Lane-based endless runner
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file overriding the default tunables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed RNG seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run the simulation without a window
    #[arg(long)]
    headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 600)]
    ticks: u32,
}

fn main() -> Result<(), ConfigError> {
    let args = Args::parse();

    let mut tunables = match &args.config {
        Some(path) => Tunables::load(path)?,
        None => Tunables::default(),
    };
    if args.seed.is_some() {
        tunables.seed = args.seed;
    }

    if args.headless {
        run_headless(tunables, args.ticks);
    } else {
        game::run(tunables);
    }
    Ok(())
}

/// Step the gameplay plugins `frames` times at 60 Hz, then print a summary.
fn run_headless(tunables: Tunables, frames: u32) {
    let mut app = App::new();
    app.insert_resource(tunables)
        .add_plugins((MinimalPlugins, StatesPlugin, LogPlugin::default()))
        // One simulated frame per update, independent of wall-clock speed.
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )))
        .add_plugins(game::configure_headless);

    for _ in 0..frames {
        app.update();
        if app.world().resource::<GameLoop>().is_game_over() {
            break;
        }
    }

    let game_loop = app.world().resource::<GameLoop>();
    let hud = app.world().resource::<HudState>();
    info!(
        "Headless run finished: {} ticks, score {}, health {:.0}%{}",
        game_loop.ticks(),
        game_loop.score(),
        hud.health * 100.0,
        if game_loop.is_game_over() { " (game over)" } else { "" }
    );
}
