/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::player::FrameInput;
use sim::event::GameEvent;
use sim::session::{GameSession, Phase};
use sim::step;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut session = GameSession::new(&config, renderer.world_viewport());

    let result = game_loop(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Lava Leap!");
    println!("Final Score: {}  (seed {})", session.score, session.seed);
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.general.tick_rate_ms);

    // A press between ticks is latched here so a fast tap is never lost,
    // then handed to exactly one simulation step.
    let mut pending_jump = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(session, &kb, &gp) {
            break;
        }

        if session.phase == Phase::Playing && jump_requested(&kb, &gp) {
            pending_jump = true;
        }

        if last_tick.elapsed() >= tick_rate {
            match session.phase {
                Phase::Playing => {
                    let frame_input = FrameInput {
                        jump: std::mem::take(&mut pending_jump),
                    };
                    let events = step::step(session, frame_input);
                    process_events(session, &events);
                }
                Phase::Title | Phase::GameOver => {
                    pending_jump = false;
                    session.tick_message();
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_events(session: &mut GameSession, events: &[GameEvent]) {
    for event in events {
        if let GameEvent::LavaReached { score } = event {
            session.set_message(&format!("Melted at score {}", score), 0);
        }
    }
}

// ── Key Constants ──

const KEYS_JUMP: &[KeyCode] = &[
    KeyCode::Char(' '),
    KeyCode::Up,
    KeyCode::Char('w'),
    KeyCode::Char('W'),
];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

fn jump_requested(kb: &InputState, gp: &GamepadState) -> bool {
    kb.any_pressed(KEYS_JUMP) || kb.clicked() || gp.jump_pressed()
}

fn start_run(session: &mut GameSession) {
    session.reset();
    session.phase = Phase::Playing;
}

/// Phase transitions and meta keys. Returns true to quit.
fn handle_meta(session: &mut GameSession, kb: &InputState, gp: &GamepadState) -> bool {
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    match session.phase {
        // ── Title Screen ──
        Phase::Title => {
            if jump_requested(kb, gp) || kb.was_pressed(KeyCode::Enter) || gp.confirm_pressed() {
                start_run(session);
            } else if kb.any_pressed(KEYS_QUIT) || esc {
                return true;
            }
        }

        // ── Playing ──
        Phase::Playing => {
            if esc {
                session.phase = Phase::Title;
                session.message.clear();
                session.message_timer = 0;
            } else if kb.any_pressed(KEYS_RESTART) {
                start_run(session);
                session.set_message("Back to the floor", 40);
            }
        }

        // ── Game Over ──
        Phase::GameOver => {
            if jump_requested(kb, gp)
                || kb.any_pressed(KEYS_RESTART)
                || kb.was_pressed(KeyCode::Enter)
                || gp.confirm_pressed()
            {
                start_run(session);
            } else if esc {
                session.phase = Phase::Title;
                session.message.clear();
                session.message_timer = 0;
            }
        }
    }

    false
}
