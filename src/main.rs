use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;

use centipede::display;
use centipede::engine::Game;
use centipede::highscores::{self, HighScores, MAX_NAME_LEN};

/// Fixed board size, in grid cells.
const BOARD_WIDTH: i32 = 50;
const BOARD_HEIGHT: i32 = 28;

/// One simulation tick per frame.
const FRAME: Duration = Duration::from_millis(50); // 20 ticks/sec

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between player movements while a direction key is held.
/// 1 frame @ 20 FPS ≈ 10 moves/sec (≈ normal OS key-repeat feel).
const MOVE_COOLDOWN: u32 = 1;

/// Min frames between shots while Space is held.
/// 2 frames @ 20 FPS ≈ 10 shots/sec of rapid fire.
const SHOOT_COOLDOWN: u32 = 2;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈200 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Screen flow ───────────────────────────────────────────────────────────────

enum GameEnd {
    Quit,
    Over,
}

/// Splash screen with flashing prompt.  Returns `false` to quit.
fn show_splash<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    scores: &HighScores,
) -> std::io::Result<bool> {
    let mut flash_on = true;
    loop {
        display::splash(out, scores, flash_on)?;
        match rx.recv_timeout(Duration::from_millis(400)) {
            Ok(Event::Key(KeyEvent { code, kind, .. })) => {
                if kind == KeyEventKind::Press {
                    return Ok(!matches!(code, KeyCode::Char('q') | KeyCode::Char('Q')));
                }
            }
            Ok(_) => {}
            Err(mpsc::RecvTimeoutError::Timeout) => flash_on = !flash_on,
            Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(false),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Run one game to completion.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and apply all their effects simultaneously.
/// This allows Space + a direction to be held at the same time with no
/// interference, on both keyboard-enhancement terminals (real release
/// events) and classic ones (keys expire after `HOLD_WINDOW` silent frames).
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    game: &mut Game,
) -> std::io::Result<GameEnd> {
    let mut rng = thread_rng();

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut move_cooldown: u32 = 0;
    let mut shoot_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut paused = false;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code.clone(), frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(GameEnd::Quit);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(GameEnd::Quit);
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            paused = !paused;
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Apply held-key actions every frame ────────────────────────────────
        if !paused {
            let left = is_held(&key_frame, &KeyCode::Left, frame)
                || is_held(&key_frame, &KeyCode::Char('a'), frame)
                || is_held(&key_frame, &KeyCode::Char('A'), frame);
            let right = is_held(&key_frame, &KeyCode::Right, frame)
                || is_held(&key_frame, &KeyCode::Char('d'), frame)
                || is_held(&key_frame, &KeyCode::Char('D'), frame);
            let up = is_held(&key_frame, &KeyCode::Up, frame)
                || is_held(&key_frame, &KeyCode::Char('w'), frame)
                || is_held(&key_frame, &KeyCode::Char('W'), frame);
            let down = is_held(&key_frame, &KeyCode::Down, frame)
                || is_held(&key_frame, &KeyCode::Char('s'), frame)
                || is_held(&key_frame, &KeyCode::Char('S'), frame);
            let shoot = is_held(&key_frame, &KeyCode::Char(' '), frame);

            // Movement — throttled so the gun doesn't teleport
            if move_cooldown == 0 {
                let mut moved = false;
                if left {
                    game.move_x(-1);
                    moved = true;
                } else if right {
                    game.move_x(1);
                    moved = true;
                }
                if up {
                    game.move_y(-1);
                    moved = true;
                } else if down {
                    game.move_y(1);
                    moved = true;
                }
                if moved {
                    move_cooldown = MOVE_COOLDOWN;
                }
            }

            // Rapid fire while Space is held
            if shoot_cooldown == 0 && shoot {
                game.shoot();
                shoot_cooldown = SHOOT_COOLDOWN;
            }
        }

        move_cooldown = move_cooldown.saturating_sub(1);
        shoot_cooldown = shoot_cooldown.saturating_sub(1);

        if !paused {
            game.advance(&mut rng);
        }

        display::render(out, game, paused)?;

        if game.game_over {
            return Ok(GameEnd::Over);
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Post-game screens ─────────────────────────────────────────────────────────

/// Blocking name prompt for a qualifying score.  Returns the entered
/// name, or `None` if the player bailed out.
fn prompt_name<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    score: u32,
) -> std::io::Result<Option<String>> {
    let mut name = String::new();
    loop {
        display::name_entry(out, score, &name)?;
        let event = match rx.recv() {
            Ok(event) => event,
            Err(_) => return Ok(None),
        };
        let Event::Key(KeyEvent { code, kind, .. }) = event else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        match code {
            KeyCode::Enter if !name.is_empty() => return Ok(Some(name)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Backspace => {
                name.pop();
            }
            KeyCode::Char(c) if name.chars().count() < MAX_NAME_LEN && c != ',' => {
                name.push(c);
            }
            _ => {}
        }
    }
}

/// Final frame with the game-over overlay; wait for restart or quit.
/// Returns `true` → quit program, `false` → play again.
fn game_over_wait<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    game: &Game,
) -> std::io::Result<bool> {
    display::render(out, game, false)?;
    loop {
        let event = match rx.recv() {
            Ok(event) => event,
            Err(_) => return Ok(true),
        };
        let Event::Key(KeyEvent { code, kind, .. }) = event else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        match code {
            KeyCode::Char('r') | KeyCode::Char('R') => return Ok(false),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(true),
            _ => {}
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let score_path = highscores::default_path();
    let mut scores = HighScores::load(&score_path);

    loop {
        if !show_splash(out, rx, &scores)? {
            return Ok(());
        }

        let mut game = {
            let mut rng = thread_rng();
            Game::new(BOARD_WIDTH, BOARD_HEIGHT, &mut rng)
        };
        match game_loop(out, rx, &mut game)? {
            GameEnd::Quit => return Ok(()),
            GameEnd::Over => {
                if scores.qualifies(game.score) {
                    if let Some(name) = prompt_name(out, rx, game.score)? {
                        scores.add(&name, game.score);
                        if let Err(err) = scores.save(&score_path) {
                            log::warn!("could not save high scores: {err}");
                        }
                    }
                }
                if game_over_wait(out, rx, &game)? {
                    return Ok(());
                }
                // Otherwise loop back to the splash screen
            }
        }
    }
}
