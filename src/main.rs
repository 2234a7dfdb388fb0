//! Headless driver: plays one session with a scripted tilt pattern and logs what happens.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use drive_fast::config::{DeviceClass, SceneConfig};
use drive_fast::constants::LOOP_TIME;
use drive_fast::game::{GameScene, SceneDelegate, SceneHandle};
use drive_fast::logging;
use drive_fast::systems::state::SceneState;
use glam::Vec2;
use thousands::Separable;
use tracing::{debug, info};

/// Command-line overrides on top of the environment configuration.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stop after this many ticks instead of waiting for the session to go home.
    #[arg(short, long, value_name = "COUNT", value_parser = clap::value_parser!(u64).range(1..))]
    ticks: Option<u64>,
    /// Seed for traffic and pickup placement.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Lay the road out for a tablet (4:3 playfield, five lanes).
    #[arg(long)]
    tablet: bool,
}

/// Logs every notification and plays the part of the host application: the first time
/// an advertisement is due it "shows" one and revives the player.
struct LoggingDelegate {
    handle: SceneHandle,
    finished: Cell<bool>,
}

impl SceneDelegate for LoggingDelegate {
    fn did_update_score(&self, score: f64) {
        debug!(score, "Score updated");
    }

    fn will_update_life_count(&self, count: u8) {
        info!(count, "Life count changing");
    }

    fn did_update_remaining_fuel(&self, fuel: f32) {
        debug!(fuel, "Fuel updated");
    }

    fn did_finish_game(&self, score: f64) {
        info!(score = (score as u64).separate_with_commas(), "Game finished");
    }

    fn did_update_game_state(&self, state: SceneState) {
        info!(%state, "Game state updated");
        match state {
            SceneState::Advertisement => {
                info!("Presenting reward ad");
                self.handle.will_present_reward_ad();
                self.handle.did_get_reward();
            }
            SceneState::Home => self.finished.set(true),
            _ => {}
        }
    }
}

/// Sways left and right, drifting slowly up and down the road.
fn tilt_at(seconds: f32) -> Vec2 {
    Vec2::new((seconds * 0.9).sin() * 0.6, (seconds * 0.25).sin() * 0.2)
}

fn main() -> anyhow::Result<()> {
    logging::setup_logging()?;

    let args = Args::parse();
    let mut config = SceneConfig::load()?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.tablet {
        config.device = DeviceClass::Tablet;
        config.width = config.height * 0.75;
    }

    let mut scene = GameScene::new(config)?;
    let delegate = Rc::new(LoggingDelegate {
        handle: scene.handle(),
        finished: Cell::new(false),
    });
    scene.set_delegate(&delegate);
    let tilt = scene.motion_channel();
    scene.start()?;

    info!(loop_time = ?LOOP_TIME, limit = ?args.ticks, "Starting game loop");

    let started = Instant::now();
    let mut last_tick = started;
    loop {
        let start = Instant::now();
        let dt = start.duration_since(last_tick).as_secs_f32();
        last_tick = start;

        // The receiving end lives as long as the scene does.
        let _ = tilt.send(tilt_at(started.elapsed().as_secs_f32()));
        scene.tick(dt);

        if delegate.finished.get() || args.ticks.is_some_and(|limit| scene.ticks() >= limit) {
            break;
        }

        let elapsed = start.elapsed();
        if elapsed < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(elapsed);
            if time != Duration::ZERO {
                spin_sleep::sleep(time);
            }
        }
    }

    info!(
        ticks = scene.ticks().separate_with_commas(),
        score = (scene.score() as u64).separate_with_commas(),
        state = %scene.state(),
        "Session ended"
    );
    Ok(())
}
