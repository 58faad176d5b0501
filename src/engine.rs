//! The simulation core.
//!
//! `Game` owns the authoritative state; every mutation goes through
//! `advance` (one fixed tick) or the player-intent methods.  All
//! randomness comes through an injected `&mut impl Rng`, so a seeded
//! RNG plus a fixed intent sequence replays a whole game exactly.

use log::{debug, info};
use rand::Rng;

use crate::entities::{
    Bullet, Centipede, Explosion, Flea, Fly, Mushroom, Player, Position,
};

// ── Tuning tables ────────────────────────────────────────────────────────────

/// Starting lives, and a bonus life at every multiple of this score.
pub const START_LIVES: i32 = 3;
pub const BONUS_LIFE_STEP: u32 = 20_000;

/// First-wave creatures: a long one marching right, a shorter one
/// offset and marching left.
pub const FIRST_CENTIPEDE_LEN: usize = 10;
pub const SECOND_CENTIPEDE_LEN: usize = 8;
/// Each new level spawns a creature of `10 + level * 2` segments.
pub const LEVEL_BASE_LEN: usize = 10;
pub const LEVEL_LEN_STEP: usize = 2;

pub const INITIAL_MUSHROOMS: usize = 25;
pub const MUSHROOMS_PER_LEVEL: usize = 10;

/// Per-tick spawn probabilities.  Flea spawning is gated on a thin
/// mushroom field so the obstacle cover keeps regrowing.
pub const FLY_SPAWN_CHANCE: f64 = 0.05;
pub const FLEA_SPAWN_CHANCE: f64 = 0.03;
pub const FLEA_MUSHROOM_FLOOR: usize = 15;
/// Chance per tick that a falling flea seeds a mushroom, once it is
/// past the top rows.
pub const FLEA_DROP_CHANCE: f64 = 0.4;
pub const FLEA_DROP_MIN_ROW: i32 = 5;

/// Flies cross the board two cells per tick.
pub const FLY_SPEED: i32 = 2;
/// Rows a segment plunges when it touches a poisoned mushroom.
pub const POISON_CHUTE_DROP: i32 = 3;

/// Ticks of frozen grace time after a life loss.
pub const RESPAWN_TICKS: i32 = 30;

// Score awards.
pub const SCORE_HEAD: u32 = 100;
pub const SCORE_BODY: u32 = 10;
pub const SCORE_FLY: u32 = 200;
pub const SCORE_FLEA: u32 = 150;
pub const SCORE_MUSHROOM_HIT: u32 = 1;
pub const SCORE_MUSHROOM_KILL: u32 = 4;

// ── Game aggregate ───────────────────────────────────────────────────────────

/// The whole simulation state.  Exclusively owned by one driver;
/// mutated only via `advance` and the intent methods.
#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub width: i32,
    pub height: i32,
    pub player: Player,
    /// Independent creatures; each keeps its own head marking.
    pub centipedes: Vec<Centipede>,
    pub bullets: Vec<Bullet>,
    pub mushrooms: Vec<Mushroom>,
    pub flies: Vec<Fly>,
    pub fleas: Vec<Flea>,
    pub explosions: Vec<Explosion>,
    pub score: u32,
    pub level: i32,
    pub lives: i32,
    /// Highest bonus-life threshold already paid out.
    pub last_life_score: u32,
    pub respawning: bool,
    pub respawn_timer: i32,
    pub game_over: bool,
    /// Absorbing terminal state.  Clearing a wave always advances the
    /// level instead, so under the current rules this never becomes
    /// true; it is kept so drivers can branch on it uniformly.
    pub won: bool,
}

impl Game {
    /// Build the initial state for a `width × height` board.
    pub fn new(width: i32, height: i32, rng: &mut impl Rng) -> Self {
        let mut game = Self {
            width,
            height,
            player: Player {
                pos: Position::new(width / 2, height - 2),
            },
            centipedes: Vec::new(),
            bullets: Vec::new(),
            mushrooms: Vec::new(),
            flies: Vec::new(),
            fleas: Vec::new(),
            explosions: Vec::new(),
            score: 0,
            level: 1,
            lives: START_LIVES,
            last_life_score: 0,
            respawning: false,
            respawn_timer: 0,
            game_over: false,
            won: false,
        };

        game.centipedes
            .push(Centipede::new(5, 2, FIRST_CENTIPEDE_LEN, 1));
        game.centipedes
            .push(Centipede::new(25, 2, SECOND_CENTIPEDE_LEN, -1));
        game.spawn_mushrooms(INITIAL_MUSHROOMS, rng);

        game
    }

    // ── Player intent ────────────────────────────────────────────────────────

    /// Propose a horizontal step.  Rejected outside `[1, width-2]` or
    /// into a mushroom cell.
    pub fn move_x(&mut self, dx: i32) {
        let new_x = self.player.pos.x + dx;
        if new_x < 1 || new_x > self.width - 2 {
            return;
        }
        let target = Position::new(new_x, self.player.pos.y);
        if self.mushrooms.iter().any(|m| m.pos == target) {
            return;
        }
        self.player.pos.x = new_x;
    }

    /// Propose a vertical step.  The player may only roam the bottom
    /// band of rows, `[height-6, height-2]`.
    pub fn move_y(&mut self, dy: i32) {
        let new_y = self.player.pos.y + dy;
        if new_y < self.height - 6 || new_y > self.height - 2 {
            return;
        }
        let target = Position::new(self.player.pos.x, new_y);
        if self.mushrooms.iter().any(|m| m.pos == target) {
            return;
        }
        self.player.pos.y = new_y;
    }

    /// Fire a bullet from one row above the gun.  There is no cap on
    /// simultaneous bullets; spent ones are compacted every tick.
    pub fn shoot(&mut self) {
        self.bullets.push(Bullet {
            pos: Position::new(self.player.pos.x, self.player.pos.y - 1),
            active: true,
        });
    }

    // ── Tick advancement ─────────────────────────────────────────────────────

    /// Advance the simulation by exactly one tick.  The sub-step order
    /// is load-bearing: later steps read positions written by earlier
    /// ones within the same tick.
    pub fn advance(&mut self, rng: &mut impl Rng) {
        // 1. Terminal states absorb everything.
        if self.game_over || self.won {
            return;
        }

        // 2. Grace period: the world stands still until the timer runs
        //    out, then the player's safety band is swept clean.
        if self.respawning {
            self.respawn_timer -= 1;
            if self.respawn_timer <= 0 {
                self.respawning = false;
                self.clear_safety_band();
            }
            return;
        }

        // 3. Bonus life on each 20k threshold crossing.
        self.award_bonus_life();

        // 4-6. Free movers.
        self.advance_bullets();
        self.advance_flies();
        self.advance_fleas(rng);

        // 7-8. Contact effects.
        self.resolve_fly_mushroom_contact();
        self.resolve_flea_player_contact();

        // 9. Visual effects age out.
        self.advance_explosions();

        // 10. New hostiles.
        self.maybe_spawn_fly(rng);
        self.maybe_spawn_flea(rng);

        // 11. The creatures themselves.
        self.advance_centipedes();

        // 12. Bullets connect.
        self.resolve_bullet_hits();

        // 13. Wave cleared → next level.
        self.check_level_advance(rng);

        // Drop spent entries so the containers cannot grow unbounded.
        self.compact();
    }

    fn award_bonus_life(&mut self) {
        if self.score >= self.last_life_score + BONUS_LIFE_STEP {
            self.lives += 1;
            self.last_life_score = self.score - (self.score % BONUS_LIFE_STEP);
            debug!(
                "bonus life at {} points, {} lives",
                self.score, self.lives
            );
        }
    }

    fn advance_bullets(&mut self) {
        for bullet in &mut self.bullets {
            if !bullet.active {
                continue;
            }
            bullet.pos.y -= 1;
            if bullet.pos.y < 0 {
                bullet.active = false;
            }
        }
    }

    fn advance_flies(&mut self) {
        for fly in &mut self.flies {
            if !fly.active {
                continue;
            }
            fly.pos.x += fly.direction * FLY_SPEED;
            fly.wing_flap = !fly.wing_flap;
            if fly.pos.x < 0 || fly.pos.x >= self.width {
                fly.active = false;
            }
        }
    }

    fn advance_fleas(&mut self, rng: &mut impl Rng) {
        for i in 0..self.fleas.len() {
            if !self.fleas[i].active {
                continue;
            }
            self.fleas[i].pos.y += 1;
            let pos = self.fleas[i].pos;

            // Seed the field on the way down, one mushroom per cell.
            if rng.gen_bool(FLEA_DROP_CHANCE) && pos.y > FLEA_DROP_MIN_ROW {
                let occupied = self.mushrooms.iter().any(|m| m.pos == pos);
                if !occupied {
                    self.mushrooms.push(Mushroom::new(pos.x, pos.y));
                }
            }

            if pos.y >= self.height - 2 {
                self.fleas[i].active = false;
            }
        }
    }

    fn resolve_fly_mushroom_contact(&mut self) {
        for i in 0..self.flies.len() {
            if !self.flies[i].active {
                continue;
            }
            let pos = self.flies[i].pos;
            if let Some(mushroom) = self.mushrooms.iter_mut().find(|m| m.pos == pos) {
                mushroom.poisoned = true;
                self.flies[i].active = false;
                self.explosions.push(Explosion::new(pos.x, pos.y));
            }
        }
    }

    fn resolve_flea_player_contact(&mut self) {
        for i in 0..self.fleas.len() {
            if !self.fleas[i].active {
                continue;
            }
            if self.fleas[i].pos == self.player.pos {
                self.lose_life();
                self.fleas[i].active = false;
            }
        }
    }

    fn advance_explosions(&mut self) {
        for explosion in &mut self.explosions {
            if !explosion.active {
                continue;
            }
            explosion.frame += 1;
            if explosion.frame >= explosion.max_frame {
                explosion.active = false;
            }
        }
    }

    fn maybe_spawn_fly(&mut self, rng: &mut impl Rng) {
        if !rng.gen_bool(FLY_SPAWN_CHANCE) {
            return;
        }
        let y = rng.gen_range(3..self.height - 7);
        let (start_x, direction) = if rng.gen_bool(0.5) {
            (self.width - 1, -1)
        } else {
            (0, 1)
        };
        self.flies.push(Fly {
            pos: Position::new(start_x, y),
            direction,
            active: true,
            wing_flap: false,
        });
    }

    fn maybe_spawn_flea(&mut self, rng: &mut impl Rng) {
        if self.mushrooms.len() >= FLEA_MUSHROOM_FLOOR {
            return;
        }
        if !rng.gen_bool(FLEA_SPAWN_CHANCE) {
            return;
        }
        let x = rng.gen_range(2..self.width - 2);
        self.fleas.push(Flea {
            pos: Position::new(x, 2),
            active: true,
        });
    }

    /// Walk every segment one step, creature by creature, in sequence
    /// order.  Segments are not processed in parallel: a mushroom
    /// regenerated by a mid-walk life loss is already visible to the
    /// segments that move after it.
    fn advance_centipedes(&mut self) {
        for ci in 0..self.centipedes.len() {
            let len = self.centipedes[ci].segments.len();
            let mut dead = vec![false; len];

            for si in 0..len {
                {
                    let seg = &mut self.centipedes[ci].segments[si];
                    seg.pos.x += seg.direction;

                    // Board edge: drop a row and turn around.
                    if seg.pos.x <= 0 || seg.pos.x >= self.width - 1 {
                        seg.pos.y += 1;
                        seg.direction = -seg.direction;
                    }
                }

                // Mushroom in the new cell: drop and turn, or plunge
                // down the poison chute (net direction unchanged).
                let pos = self.centipedes[ci].segments[si].pos;
                let touched = self
                    .mushrooms
                    .iter()
                    .find(|m| m.pos == pos)
                    .map(|m| m.poisoned);
                if let Some(poisoned) = touched {
                    let seg = &mut self.centipedes[ci].segments[si];
                    if poisoned {
                        seg.pos.y += POISON_CHUTE_DROP;
                        seg.direction = -seg.direction;
                    } else {
                        seg.pos.y += 1;
                    }
                    seg.direction = -seg.direction;
                }

                // Direct contact with the gun.
                if self.centipedes[ci].segments[si].pos == self.player.pos {
                    self.lose_life();
                }

                // Reaching the defensive band costs a life whether or
                // not the gun was hit, and removes the segment so one
                // escapee cannot drain several lives.
                if self.centipedes[ci].segments[si].pos.y >= self.height - 2 {
                    dead[si] = true;
                    self.lose_life();
                }
            }

            if dead.iter().any(|&d| d) {
                let mut idx = 0;
                self.centipedes[ci].segments.retain(|_| {
                    let keep = !dead[idx];
                    idx += 1;
                    keep
                });
                self.centipedes[ci].promote_head();
            }
        }
    }

    /// Each active bullet lands at most one hit per tick, tested in
    /// fixed precedence: segments, flies, fleas, mushrooms.
    fn resolve_bullet_hits(&mut self) {
        for bi in 0..self.bullets.len() {
            if !self.bullets[bi].active {
                continue;
            }
            let pos = self.bullets[bi].pos;

            if let Some((ci, si)) = self.segment_at(pos) {
                self.bullets[bi].active = false;
                self.explosions.push(Explosion::new(pos.x, pos.y));
                let was_head = self.centipedes[ci].segments[si].is_head;
                self.score += if was_head { SCORE_HEAD } else { SCORE_BODY };
                self.centipedes[ci].segments.remove(si);
                self.centipedes[ci].promote_head();
                continue;
            }

            if let Some(fly) = self
                .flies
                .iter_mut()
                .find(|f| f.active && f.pos == pos)
            {
                fly.active = false;
                self.bullets[bi].active = false;
                self.explosions.push(Explosion::new(pos.x, pos.y));
                self.score += SCORE_FLY;
                continue;
            }

            if let Some(flea) = self
                .fleas
                .iter_mut()
                .find(|f| f.active && f.pos == pos)
            {
                flea.active = false;
                self.bullets[bi].active = false;
                self.explosions.push(Explosion::new(pos.x, pos.y));
                self.score += SCORE_FLEA;
                continue;
            }

            if let Some(mi) = self.mushrooms.iter().position(|m| m.pos == pos) {
                self.bullets[bi].active = false;
                self.explosions.push(Explosion::new(pos.x, pos.y));
                self.mushrooms[mi].health -= 1;
                self.score += SCORE_MUSHROOM_HIT;
                if self.mushrooms[mi].health <= 0 {
                    self.mushrooms.remove(mi);
                    self.score += SCORE_MUSHROOM_KILL;
                }
            }
        }
    }

    fn check_level_advance(&mut self, rng: &mut impl Rng) {
        if !self.centipedes.iter().all(|c| c.is_empty()) {
            return;
        }
        self.level += 1;
        info!("wave cleared, entering level {}", self.level);
        let length = LEVEL_BASE_LEN + self.level as usize * LEVEL_LEN_STEP;
        self.centipedes.clear();
        self.centipedes.push(Centipede::new(5, 2, length, 1));
        self.spawn_mushrooms(MUSHROOMS_PER_LEVEL, rng);
        self.regenerate_mushrooms();
    }

    fn compact(&mut self) {
        self.bullets.retain(|b| b.active);
        self.flies.retain(|f| f.active);
        self.fleas.retain(|f| f.active);
        self.explosions.retain(|e| e.active);
        self.centipedes.retain(|c| !c.is_empty());
    }

    // ── Life & level bookkeeping ─────────────────────────────────────────────

    /// Take a life.  Out of lives ends the game; otherwise the grace
    /// timer starts, the gun respawns at its starting cell, bullets are
    /// wiped and the mushroom field regrows to full, unpoisoned health
    /// so a fresh life never starts inside an existing poison chute.
    pub fn lose_life(&mut self) {
        self.lives -= 1;
        if self.lives <= 0 {
            self.game_over = true;
            info!("out of lives, final score {}", self.score);
            return;
        }
        info!("life lost, {} remaining", self.lives);
        self.respawning = true;
        self.respawn_timer = RESPAWN_TICKS;
        self.player.pos = Position::new(self.width / 2, self.height - 2);
        self.bullets.clear();
        self.regenerate_mushrooms();
    }

    fn regenerate_mushrooms(&mut self) {
        for mushroom in &mut self.mushrooms {
            mushroom.health = 4;
            mushroom.poisoned = false;
        }
    }

    fn spawn_mushrooms(&mut self, count: usize, rng: &mut impl Rng) {
        for _ in 0..count {
            let x = rng.gen_range(1..self.width - 1);
            let y = rng.gen_range(2..self.height - 3);
            self.mushrooms.push(Mushroom::new(x, y));
        }
    }

    /// Sweep hostile segments out of the player's upper safety band
    /// when the grace period ends.
    fn clear_safety_band(&mut self) {
        let limit = self.height - 10;
        for centipede in &mut self.centipedes {
            let before = centipede.segments.len();
            centipede.segments.retain(|seg| seg.pos.y < limit);
            if centipede.segments.len() != before {
                centipede.promote_head();
            }
        }
        self.centipedes.retain(|c| !c.is_empty());
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    fn segment_at(&self, pos: Position) -> Option<(usize, usize)> {
        for (ci, centipede) in self.centipedes.iter().enumerate() {
            if let Some(si) = centipede.segments.iter().position(|s| s.pos == pos) {
                return Some((ci, si));
            }
        }
        None
    }

    pub fn segment_count(&self) -> usize {
        self.centipedes.iter().map(|c| c.len()).sum()
    }

    pub fn active_bullets(&self) -> usize {
        self.bullets.iter().filter(|b| b.active).count()
    }

    pub fn active_flies(&self) -> usize {
        self.flies.iter().filter(|f| f.active).count()
    }

    // ── Snapshot ─────────────────────────────────────────────────────────────

    /// Pure read: the board as layered cell glyphs.  Later layers
    /// overwrite earlier ones; the gun is drawn last and hidden while
    /// respawning.
    pub fn render_grid(&self) -> Vec<Vec<char>> {
        let mut board = vec![vec![' '; self.width as usize]; self.height as usize];

        for mushroom in &self.mushrooms {
            let glyph = if mushroom.poisoned {
                'X'
            } else {
                match mushroom.health {
                    4 => 'M',
                    3 => 'm',
                    2 => '*',
                    _ => '.',
                }
            };
            put(&mut board, mushroom.pos.x, mushroom.pos.y, glyph);
        }

        for fly in &self.flies {
            if !fly.active {
                continue;
            }
            put(&mut board, fly.pos.x, fly.pos.y, '✺');
            if fly.wing_flap {
                put(&mut board, fly.pos.x - fly.direction, fly.pos.y, '~');
                put(&mut board, fly.pos.x - fly.direction * 2, fly.pos.y, '.');
            }
        }

        for flea in &self.fleas {
            if flea.active {
                put(&mut board, flea.pos.x, flea.pos.y, '┃');
            }
        }

        for centipede in &self.centipedes {
            for seg in &centipede.segments {
                let glyph = if seg.is_head { '@' } else { 'O' };
                put(&mut board, seg.pos.x, seg.pos.y, glyph);
            }
        }

        for explosion in &self.explosions {
            if explosion.active {
                put(&mut board, explosion.pos.x, explosion.pos.y, explosion.glyph());
            }
        }

        for bullet in &self.bullets {
            if bullet.active {
                put(&mut board, bullet.pos.x, bullet.pos.y, '|');
            }
        }

        if !self.respawning {
            put(&mut board, self.player.pos.x, self.player.pos.y, 'A');
        }

        board
    }
}

fn put(board: &mut [Vec<char>], x: i32, y: i32, glyph: char) {
    if y >= 0 && (y as usize) < board.len() && x >= 0 && (x as usize) < board[y as usize].len() {
        board[y as usize][x as usize] = glyph;
    }
}
