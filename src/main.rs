/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use config::{GameConfig, LogConfig};
use error::GameError;
use sim::event::GameEvent;
use sim::level::{advance_room, new_game};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Enter];

fn main() {
    let (config, config_err) = GameConfig::load();

    // The terminal belongs to the game, so logs go to a file.
    if let Err(e) = init_tracing(&config.log) {
        eprintln!("Logging disabled: could not open {}: {e}", config.log.file.display());
    }
    if let Some(e) = config_err {
        warn!(error = %e, "config_fallback_to_defaults");
    }
    info!(
        tick_rate_ms = config.speed.tick_rate_ms,
        start_room = config.play.start_room,
        health = config.play.health,
        "startup"
    );

    let mut world = WorldState::new(config.play.health);
    if let Err(e) = new_game(&mut world, config.play.start_room, config.play.health) {
        error!(error = %e, "start_failed");
        eprintln!("Could not start: {e}");
        return;
    }

    let mut renderer = Renderer::new();
    let mut kb = InputState::new();

    if let Err(e) = renderer.init() {
        error!(error = %e, "terminal_init_failed");
        eprintln!("Terminal init failed: {e}");
        return;
    }
    if let Err(e) = kb.enable_release_events() {
        warn!(error = %e, "release_events_unavailable");
    }

    let result = game_loop(&mut world, &mut renderer, &mut kb, &config);

    if let Err(e) = kb.disable_release_events() {
        warn!(error = %e, "release_events_pop_failed");
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game_error");
        eprintln!("Game error: {e}");
    }

    info!(score = world.score, room = world.room_index, "shutdown");
    println!();
    println!("Thanks for playing Block Toss!");
    println!("Final Score: {}", world.score);
}

fn init_tracing(log: &LogConfig) -> std::io::Result<()> {
    let file = File::create(&log.file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    // A second init (tests, embedding) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    kb: &mut InputState,
    config: &GameConfig,
) -> Result<(), GameError> {
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }

        let finished = matches!(world.phase, Phase::GameOver | Phase::GameComplete);
        if finished && kb.any_pressed(KEYS_RESTART) {
            info!(score = world.score, "restart");
            let health = world.starting_health;
            new_game(world, config.play.start_room, health)?;
        }

        if last_tick.elapsed() >= tick_rate {
            let input = kb.frame_input();
            match world.phase {
                Phase::Playing => {
                    let events = step::step(world, input);
                    log_events(world.tick, &events);
                }
                Phase::RoomClear => {
                    advance_room(world)?;
                }
                Phase::GameOver | Phase::GameComplete => {}
            }
            last_tick = Instant::now();
        }

        renderer.draw_frame(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn log_events(tick: u64, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Knock { kind } => debug!(tick, ?kind, "knock"),
            GameEvent::EnemySpawned { kind } => debug!(tick, ?kind, "enemy_spawned"),
            GameEvent::EnemyDestroyed { kind } => debug!(tick, ?kind, "enemy_destroyed"),
            GameEvent::PlayerHurt { health } => info!(tick, health, "player_hurt"),
            GameEvent::PlayerDied => info!(tick, "player_died"),
            GameEvent::RoomCleared => info!(tick, "room_cleared"),
            other => debug!(tick, event = ?other, "event"),
        }
    }
}
