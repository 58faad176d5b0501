//! Rendering layer — all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state.  No game logic is performed; this module only translates
//! the engine's grid snapshot and counters into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use crate::engine::Game;
use crate::highscores::HighScores;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;
const C_PLAYER: Color = Color::Green;
const C_HEAD: Color = Color::Magenta;
const C_BODY: Color = Color::DarkMagenta;
const C_MUSHROOM: Color = Color::DarkGreen;
const C_POISON: Color = Color::Magenta;
const C_BULLET: Color = Color::Yellow;
const C_FLY: Color = Color::DarkYellow;
const C_FLEA: Color = Color::Yellow;
const C_TRAIL: Color = Color::DarkGrey;
const C_EXPLOSION: Color = Color::Red;
const C_STATUS: Color = Color::Red;
const C_PAUSED: Color = Color::Yellow;
const C_TITLE: Color = Color::Cyan;

/// Rows of chrome above the board: HUD plus the top border.
const BOARD_TOP: u16 = 2;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, game: &Game, paused: bool) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_hud(out, game)?;
    draw_board(out, game)?;
    draw_status(out, game, paused)?;
    draw_controls_hint(out, game)?;

    if game.game_over {
        draw_game_over(out, game)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, BOARD_TOP + game.height as u16 + 3))?;
    out.flush()?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, game: &Game) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>7}", game.score)))?;

    out.queue(Print(format!("  Level:{:>2}", game.level)))?;

    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!(
        "  Bullets:{:>3}  Segments:{:>3}  Flies:{:>2}",
        game.active_bullets(),
        game.segment_count(),
        game.active_flies()
    )))?;

    let hearts: String = "♥".repeat(game.lives.max(0) as usize);
    out.queue(Print("  Lives:"))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(hearts))?;

    Ok(())
}

// ── Board ─────────────────────────────────────────────────────────────────────

fn glyph_color(glyph: char) -> Color {
    match glyph {
        'A' => C_PLAYER,
        '@' => C_HEAD,
        'O' => C_BODY,
        'X' => C_POISON,
        'M' | 'm' | '*' | '.' => C_MUSHROOM,
        '|' => C_BULLET,
        '✺' => C_FLY,
        '┃' => C_FLEA,
        '~' => C_TRAIL,
        '✶' | '✸' | '✹' => C_EXPLOSION,
        _ => Color::White,
    }
}

fn draw_board<W: Write>(out: &mut W, game: &Game) -> std::io::Result<()> {
    let grid = game.render_grid();
    let w = game.width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, BOARD_TOP - 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w))))?;
    out.queue(cursor::MoveTo(0, BOARD_TOP + game.height as u16))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w))))?;

    for (row_idx, row) in grid.iter().enumerate() {
        let screen_row = BOARD_TOP + row_idx as u16;
        out.queue(cursor::MoveTo(0, screen_row))?;
        out.queue(style::SetForegroundColor(C_BORDER))?;
        out.queue(Print("│"))?;

        for (col_idx, &glyph) in row.iter().enumerate() {
            if glyph == ' ' {
                continue;
            }
            out.queue(cursor::MoveTo(1 + col_idx as u16, screen_row))?;
            out.queue(style::SetForegroundColor(glyph_color(glyph)))?;
            out.queue(Print(glyph))?;
        }

        out.queue(cursor::MoveTo(1 + w as u16, screen_row))?;
        out.queue(style::SetForegroundColor(C_BORDER))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── Status & hint rows ────────────────────────────────────────────────────────

fn draw_status<W: Write>(out: &mut W, game: &Game, paused: bool) -> std::io::Result<()> {
    let row = BOARD_TOP + game.height as u16 + 1;
    out.queue(cursor::MoveTo(1, row))?;
    if game.respawning {
        out.queue(style::SetForegroundColor(C_STATUS))?;
        out.queue(Print(format!(
            "RESPAWNING... {}",
            game.respawn_timer / 10 + 1
        )))?;
    } else if paused {
        out.queue(style::SetForegroundColor(C_PAUSED))?;
        out.queue(Print("PAUSED"))?;
    }
    Ok(())
}

fn draw_controls_hint<W: Write>(out: &mut W, game: &Game) -> std::io::Result<()> {
    let row = BOARD_TOP + game.height as u16 + 2;
    out.queue(cursor::MoveTo(1, row))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "← → / A D : Move   ↑ ↓ / W S : Up/Down   SPACE : Fire   P : Pause   Q : Quit",
    ))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, game: &Game) -> std::io::Result<()> {
    let lines = [
        "╔════════════════════╗",
        "║     GAME  OVER     ║",
        "╚════════════════════╝",
    ];
    let cx = (game.width as u16 + 2) / 2;
    let start_row = BOARD_TOP + game.height as u16 / 2 - 3;

    out.queue(style::SetForegroundColor(C_STATUS))?;
    for (i, line) in lines.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(Print(*line))?;
    }

    let score_line = format!("Final Score: {:>6}", game.score);
    let col = cx.saturating_sub(score_line.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, start_row + 3))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(&score_line))?;

    let hint = "R - Play Again  Q - Quit";
    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, start_row + 4))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(hint))?;

    Ok(())
}

// ── Splash screen ─────────────────────────────────────────────────────────────

const TITLE_ART: &[&str] = &[
    r"   _____ ______ _   _ _______ _____ _____  ______ _____  ______ ",
    r"  / ____|  ____| \ | |__   __|_   _|  __ \|  ____|  __ \|  ____|",
    r" | |    | |__  |  \| |  | |    | | | |__) | |__  | |  | | |__   ",
    r" | |    |  __| | . ` |  | |    | | |  ___/|  __| | |  | |  __|  ",
    r" | |____| |____| |\  |  | |   _| |_| |    | |____| |__| | |____ ",
    r"  \_____|______|_| \_|  |_|  |_____|_|    |______|_____/|______|",
];

/// Draw the splash screen: title art, bestiary legend, top-10 list and
/// a flashing continue prompt.
pub fn splash<W: Write>(
    out: &mut W,
    scores: &HighScores,
    flash_on: bool,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, _) = terminal::size()?;
    let cx = width / 2;
    let mut row: u16 = 1;

    out.queue(style::SetForegroundColor(C_TITLE))?;
    for line in TITLE_ART {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print(*line))?;
        row += 1;
    }
    row += 1;

    let legend: &[(&str, Color)] = &[
        ("@OOOOOOOO  Centipede — 10 pts a segment, 100 for the head", C_BODY),
        ("✺~.        Fly — 200 pts, poisons mushrooms on contact", C_FLY),
        ("┃          Flea — 150 pts, seeds mushrooms as it falls", C_FLEA),
        ("M          Mushroom — 4 hits to clear, X when poisoned", C_MUSHROOM),
    ];
    for (line, color) in legend {
        let col = cx.saturating_sub(30);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*line))?;
        row += 1;
    }
    row += 1;

    if !scores.is_empty() {
        let header = "═══ HIGH SCORES ═══";
        let col = cx.saturating_sub(header.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_TITLE))?;
        out.queue(Print(header))?;
        row += 1;

        for (i, entry) in scores.entries.iter().enumerate() {
            let line = format!("{:>2}. {:<10}  {:>6}", i + 1, entry.name, entry.score);
            let col = cx.saturating_sub(line.chars().count() as u16 / 2);
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print(&line))?;
            row += 1;
        }
        row += 1;
    }

    if flash_on {
        let prompt = ">>> PRESS ANY KEY TO PLAY <<<";
        let col = cx.saturating_sub(prompt.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row + 1))?;
        out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
        out.queue(Print(prompt))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

// ── Name entry ────────────────────────────────────────────────────────────────

/// Draw the qualifying-score name prompt with the partial name typed
/// so far.
pub fn name_entry<W: Write>(out: &mut W, score: u32, name: &str) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let lines: &[(String, Color)] = &[
        ("NEW HIGH SCORE!".to_string(), C_STATUS),
        (format!("Your Score: {}", score), C_HUD_SCORE),
        ("Enter your name (max 10 chars):".to_string(), Color::White),
        (format!("{}_", name), C_PLAYER),
        ("Press [Enter] to save".to_string(), C_HINT),
    ];

    for (i, (line, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, cy.saturating_sub(3) + i as u16 * 2))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(line))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}
