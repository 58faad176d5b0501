use centipede::engine::*;
use centipede::entities::*;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

// ── Deterministic RNGs for probability-gated paths ────────────────────────────

/// Every probability gate fails, every range draw returns its minimum.
struct NeverRng;

impl RngCore for NeverRng {
    fn next_u32(&mut self) -> u32 {
        // A range draw's minimum needs the widening-multiply high word to
        // be zero, i.e. a small draw; `gen_range` (i32) pulls from
        // `next_u32`, so this returns 0. `gen_bool` pulls from `next_u64`
        // (all-ones below), so probability gates still fail.
        0
    }
    fn next_u64(&mut self) -> u64 {
        u64::MAX
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = 0xFF;
        }
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Every probability gate fires, every range draw returns its minimum.
struct AlwaysRng;

impl RngCore for AlwaysRng {
    fn next_u32(&mut self) -> u32 {
        0
    }
    fn next_u64(&mut self) -> u64 {
        0
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = 0;
        }
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

// ── State builders ────────────────────────────────────────────────────────────

fn make_game() -> Game {
    Game {
        width: 50,
        height: 28,
        player: Player {
            pos: Position::new(25, 26),
        },
        centipedes: Vec::new(),
        bullets: Vec::new(),
        mushrooms: Vec::new(),
        flies: Vec::new(),
        fleas: Vec::new(),
        explosions: Vec::new(),
        score: 0,
        level: 1,
        lives: 3,
        last_life_score: 0,
        respawning: false,
        respawn_timer: 0,
        game_over: false,
        won: false,
    }
}

fn seg(x: i32, y: i32, direction: i32) -> Segment {
    Segment {
        pos: Position::new(x, y),
        direction,
        is_head: false,
    }
}

fn creature(segments: Vec<Segment>) -> Centipede {
    let mut c = Centipede { segments };
    c.promote_head();
    c
}

/// A lone segment far from the action, so single-tick tests don't
/// trigger a level advance when their target creature dies.
fn parked() -> Centipede {
    creature(vec![seg(40, 2, -1)])
}

fn bullet(x: i32, y: i32) -> Bullet {
    Bullet {
        pos: Position::new(x, y),
        active: true,
    }
}

fn mush(x: i32, y: i32) -> Mushroom {
    Mushroom::new(x, y)
}

fn poisoned_mush(x: i32, y: i32) -> Mushroom {
    Mushroom {
        poisoned: true,
        ..Mushroom::new(x, y)
    }
}

fn fly(x: i32, y: i32, direction: i32) -> Fly {
    Fly {
        pos: Position::new(x, y),
        direction,
        active: true,
        wing_flap: false,
    }
}

fn flea(x: i32, y: i32) -> Flea {
    Flea {
        pos: Position::new(x, y),
        active: true,
    }
}

fn head_count(c: &Centipede) -> usize {
    c.segments.iter().filter(|s| s.is_head).count()
}

// ── Game::new ─────────────────────────────────────────────────────────────────

#[test]
fn new_game_layout() {
    let mut rng = StdRng::seed_from_u64(42);
    let g = Game::new(50, 28, &mut rng);

    assert_eq!(g.player.pos, Position::new(25, 26));
    assert_eq!(g.lives, 3);
    assert_eq!(g.level, 1);
    assert_eq!(g.score, 0);
    assert!(!g.game_over && !g.won && !g.respawning);

    // Two independent creatures: 10 marching right, 8 marching left
    assert_eq!(g.centipedes.len(), 2);
    assert_eq!(g.centipedes[0].len(), 10);
    assert_eq!(g.centipedes[1].len(), 8);
    assert!(g.centipedes[0].segments.iter().all(|s| s.direction == 1));
    assert!(g.centipedes[1].segments.iter().all(|s| s.direction == -1));

    assert_eq!(g.mushrooms.len(), 25);
    for m in &g.mushrooms {
        assert_eq!(m.health, 4);
        assert!(!m.poisoned);
        assert!(m.pos.x >= 1 && m.pos.x <= 48);
        assert!(m.pos.y >= 2 && m.pos.y <= 24);
    }
}

#[test]
fn new_game_one_head_per_creature() {
    let mut rng = StdRng::seed_from_u64(1);
    let g = Game::new(50, 28, &mut rng);
    for c in &g.centipedes {
        assert_eq!(head_count(c), 1);
        assert!(c.segments.last().unwrap().is_head);
    }
}

// ── Player intent ─────────────────────────────────────────────────────────────

#[test]
fn move_x_normal_and_clamped() {
    let mut g = make_game();
    g.move_x(-1);
    assert_eq!(g.player.pos.x, 24);

    g.player.pos.x = 1;
    g.move_x(-1);
    assert_eq!(g.player.pos.x, 1); // left wall

    g.player.pos.x = 48;
    g.move_x(1);
    assert_eq!(g.player.pos.x, 48); // right wall
}

#[test]
fn move_x_blocked_by_mushroom() {
    let mut g = make_game();
    g.mushrooms.push(mush(24, 26));
    g.move_x(-1);
    assert_eq!(g.player.pos.x, 25);
}

#[test]
fn move_y_stays_in_bottom_band() {
    let mut g = make_game(); // y = 26 = height-2
    g.move_y(1);
    assert_eq!(g.player.pos.y, 26); // cannot leave the band downward

    for _ in 0..10 {
        g.move_y(-1);
    }
    assert_eq!(g.player.pos.y, 22); // height-6 is the ceiling
}

#[test]
fn move_y_blocked_by_mushroom() {
    let mut g = make_game();
    g.mushrooms.push(mush(25, 25));
    g.move_y(-1);
    assert_eq!(g.player.pos.y, 26);
}

#[test]
fn shoot_spawns_bullet_above_gun() {
    let mut g = make_game();
    g.shoot();
    assert_eq!(g.bullets.len(), 1);
    assert_eq!(g.bullets[0].pos, Position::new(25, 25));
    assert!(g.bullets[0].active);
}

#[test]
fn shoot_has_no_cap() {
    let mut g = make_game();
    for _ in 0..10 {
        g.shoot();
    }
    assert_eq!(g.bullets.len(), 10);
}

// ── Bullets ───────────────────────────────────────────────────────────────────

#[test]
fn bullets_rise_one_row_per_tick() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.bullets.push(bullet(10, 5));
    g.advance(&mut NeverRng);
    assert_eq!(g.bullets[0].pos, Position::new(10, 4));
}

#[test]
fn bullet_dies_off_the_top() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.bullets.push(bullet(10, 0));
    g.advance(&mut NeverRng);
    assert!(g.bullets.is_empty()); // deactivated and compacted
}

// ── Centipede movement ────────────────────────────────────────────────────────

#[test]
fn segment_marches_horizontally() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1)]));
    g.advance(&mut NeverRng);
    assert_eq!(g.centipedes[0].segments[0].pos, Position::new(6, 2));
}

#[test]
fn segment_drops_and_reverses_at_right_edge() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(48, 2, 1)]));
    g.advance(&mut NeverRng);
    let s = &g.centipedes[0].segments[0];
    assert_eq!(s.pos, Position::new(49, 3));
    assert_eq!(s.direction, -1);
}

#[test]
fn segment_drops_and_reverses_at_left_edge() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(1, 2, -1)]));
    g.advance(&mut NeverRng);
    let s = &g.centipedes[0].segments[0];
    assert_eq!(s.pos, Position::new(0, 3));
    assert_eq!(s.direction, 1);
}

#[test]
fn ordinary_mushroom_drops_one_row_and_reverses() {
    let mut g = make_game();
    g.mushrooms.push(mush(10, 5));
    g.centipedes.push(creature(vec![seg(9, 5, 1)]));
    g.advance(&mut NeverRng);
    let s = &g.centipedes[0].segments[0];
    assert_eq!(s.pos, Position::new(10, 6));
    assert_eq!(s.direction, -1);
}

#[test]
fn poisoned_mushroom_chutes_three_rows() {
    let mut g = make_game();
    g.mushrooms.push(poisoned_mush(10, 5));
    g.centipedes.push(creature(vec![seg(9, 5, 1)]));
    g.advance(&mut NeverRng);
    let s = &g.centipedes[0].segments[0];
    // Three rows down, direction reversed twice — net heading unchanged
    assert_eq!(s.pos, Position::new(10, 8));
    assert_eq!(s.direction, 1);
}

#[test]
fn segment_on_gun_costs_a_life() {
    let mut g = make_game();
    g.player.pos = Position::new(25, 24); // climbed into the band
    g.centipedes.push(creature(vec![seg(24, 24, 1)]));
    g.centipedes.push(parked());
    g.advance(&mut NeverRng);

    assert_eq!(g.lives, 2);
    assert!(g.respawning);
    assert_eq!(g.respawn_timer, RESPAWN_TICKS);
    assert_eq!(g.player.pos, Position::new(25, 26)); // respawned
    // A direct hit above the bottom row does not remove the segment
    assert_eq!(g.centipedes[0].segments[0].pos, Position::new(25, 24));
}

#[test]
fn segment_reaching_bottom_band_costs_a_life_and_dies() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(10, 26, 1)]));
    g.centipedes.push(parked());
    g.advance(&mut NeverRng);

    assert_eq!(g.lives, 2); // exactly one life per escapee
    assert!(g.respawning);
    assert_eq!(g.centipedes.len(), 1); // escapee compacted away
    assert_eq!(g.centipedes[0].segments[0].pos.x, 39); // parked survivor
}

// ── Bullet collisions ─────────────────────────────────────────────────────────

#[test]
fn head_kill_scores_100() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1)]));
    g.centipedes.push(parked());
    g.bullets.push(bullet(6, 3)); // meets the segment at (6,2)
    g.advance(&mut NeverRng);

    assert_eq!(g.score, 100);
    assert_eq!(g.centipedes.len(), 1); // only the parked creature left
    assert_eq!(g.level, 1); // no wave clear while a creature lives
    assert!(g.bullets.is_empty());
    assert_eq!(g.explosions.len(), 1);
}

#[test]
fn body_kill_scores_10_and_promotes_nothing() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1), seg(6, 2, 1)]));
    g.bullets.push(bullet(6, 3)); // hits the trailing body at (6,2)
    g.advance(&mut NeverRng);

    assert_eq!(g.score, 10);
    assert_eq!(g.centipedes[0].len(), 1);
    assert_eq!(head_count(&g.centipedes[0]), 1);
    assert_eq!(g.centipedes[0].segments[0].pos, Position::new(7, 2));
}

#[test]
fn killing_the_head_promotes_the_new_front() {
    let mut g = make_game();
    g.centipedes
        .push(creature(vec![seg(5, 2, 1), seg(6, 2, 1), seg(7, 2, 1)]));
    g.bullets.push(bullet(8, 3)); // meets the head at (8,2)
    g.advance(&mut NeverRng);

    assert_eq!(g.score, 100);
    let c = &g.centipedes[0];
    assert_eq!(c.len(), 2);
    assert_eq!(head_count(c), 1);
    assert_eq!(c.segments.last().unwrap().pos, Position::new(7, 2));
    assert!(c.segments.last().unwrap().is_head);
}

#[test]
fn creatures_keep_independent_heads() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1), seg(6, 2, 1)]));
    g.centipedes.push(creature(vec![seg(40, 10, -1), seg(41, 10, -1)]));
    g.bullets.push(bullet(6, 3));
    g.advance(&mut NeverRng);

    // First creature lost its tail; second is untouched
    assert_eq!(g.centipedes[0].len(), 1);
    assert_eq!(g.centipedes[1].len(), 2);
    assert_eq!(head_count(&g.centipedes[0]), 1);
    assert_eq!(head_count(&g.centipedes[1]), 1);
}

#[test]
fn one_hit_per_bullet_flea_shields_mushroom() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.mushrooms.push(mush(10, 7));
    g.fleas.push(flea(10, 6)); // falls onto the mushroom's cell
    g.bullets.push(bullet(10, 8)); // rises to the same cell
    g.advance(&mut NeverRng);

    // Fleas outrank mushrooms; the spent bullet stops there
    assert_eq!(g.score, 150);
    assert!(g.fleas.is_empty());
    assert_eq!(g.mushrooms[0].health, 4);
    assert!(g.bullets.is_empty());
}

#[test]
fn second_bullet_passes_once_target_is_gone() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1)]));
    g.centipedes.push(parked());
    g.bullets.push(bullet(6, 3));
    g.bullets.push(bullet(6, 3));
    g.advance(&mut NeverRng);

    // First bullet takes the head; the second finds nothing there
    assert_eq!(g.score, 100);
    assert_eq!(g.bullets.len(), 1);
    assert_eq!(g.bullets[0].pos, Position::new(6, 2));
}

#[test]
fn mushroom_depletes_after_four_hits() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1)]));
    g.mushrooms.push(mush(30, 10));

    for _ in 0..4 {
        g.bullets.push(bullet(30, 11));
        g.advance(&mut NeverRng);
    }

    assert!(g.mushrooms.is_empty());
    assert_eq!(g.score, 8); // 1+1+1+(1+4)
}

#[test]
fn fly_kill_scores_200() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.flies.push(fly(8, 5, 1)); // lands on (10,5) this tick
    g.bullets.push(bullet(10, 6)); // rises to (10,5)
    g.advance(&mut NeverRng);

    assert_eq!(g.score, 200);
    assert!(g.flies.is_empty());
    assert_eq!(g.explosions.len(), 1);
}

#[test]
fn flea_kill_scores_150() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.fleas.push(flea(12, 7)); // falls to (12,8) this tick
    g.bullets.push(bullet(12, 9)); // rises to (12,8)
    g.advance(&mut NeverRng);

    assert_eq!(g.score, 150);
    assert!(g.fleas.is_empty());
}

// ── Flies & fleas ─────────────────────────────────────────────────────────────

#[test]
fn fly_crosses_two_cells_and_flaps() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.flies.push(fly(10, 5, 1));
    g.advance(&mut NeverRng);
    assert_eq!(g.flies[0].pos, Position::new(12, 5));
    assert!(g.flies[0].wing_flap);
}

#[test]
fn fly_leaves_the_board() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.flies.push(fly(49, 5, 1));
    g.advance(&mut NeverRng);
    assert!(g.flies.is_empty());
}

#[test]
fn fly_poisons_mushroom_on_contact() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.mushrooms.push(mush(10, 5));
    g.flies.push(fly(8, 5, 1));
    g.advance(&mut NeverRng);

    assert!(g.mushrooms[0].poisoned);
    assert!(g.flies.is_empty());
    assert_eq!(g.explosions.len(), 1);
    assert_eq!(g.explosions[0].pos, Position::new(10, 5));
}

#[test]
fn flea_seeds_a_mushroom_past_row_five() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(30, 2, 1)]));
    // A thick field suppresses the flea-spawn gate
    for i in 1..=15 {
        g.mushrooms.push(mush(i, 20));
    }
    g.fleas.push(flea(10, 6));
    g.advance(&mut AlwaysRng);

    assert_eq!(g.fleas[0].pos, Position::new(10, 7));
    assert!(g.mushrooms.iter().any(|m| m.pos == Position::new(10, 7)));
    assert_eq!(g.mushrooms.len(), 16);
}

#[test]
fn flea_does_not_seed_near_the_top() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(30, 2, 1)]));
    for i in 1..=15 {
        g.mushrooms.push(mush(i, 20));
    }
    g.fleas.push(flea(10, 3));
    g.advance(&mut AlwaysRng);

    assert_eq!(g.fleas[0].pos, Position::new(10, 4));
    assert_eq!(g.mushrooms.len(), 15);
}

#[test]
fn flea_expires_at_the_bottom() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.fleas.push(flea(10, 25));
    g.advance(&mut NeverRng);
    assert!(g.fleas.is_empty());
}

#[test]
fn flea_on_gun_costs_a_life() {
    let mut g = make_game();
    g.player.pos = Position::new(25, 24);
    g.centipedes.push(parked());
    g.fleas.push(flea(25, 23)); // falls onto the gun
    g.advance(&mut NeverRng);

    assert_eq!(g.lives, 2);
    assert!(g.respawning);
    assert!(g.fleas.is_empty());
}

#[test]
fn spawn_gates_fire_under_always_rng() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(30, 2, 1)]));
    g.advance(&mut AlwaysRng);

    // Fly enters from the right wall, flea drops in at the top
    assert_eq!(g.flies.len(), 1);
    assert_eq!(g.flies[0].pos, Position::new(49, 3));
    assert_eq!(g.flies[0].direction, -1);
    assert_eq!(g.fleas.len(), 1);
    assert_eq!(g.fleas[0].pos, Position::new(2, 2));
}

// ── Explosions ────────────────────────────────────────────────────────────────

#[test]
fn explosions_age_out_after_max_frame() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.explosions.push(Explosion::new(10, 10));

    for expected_frame in 1..4 {
        g.advance(&mut NeverRng);
        assert_eq!(g.explosions[0].frame, expected_frame);
    }
    g.advance(&mut NeverRng);
    assert!(g.explosions.is_empty());
}

// ── Lives, respawn, terminal states ───────────────────────────────────────────

#[test]
fn lose_life_resets_the_field() {
    let mut g = make_game();
    g.player.pos = Position::new(10, 23);
    g.bullets.push(bullet(10, 5));
    g.bullets.push(bullet(11, 4));
    g.mushrooms.push(Mushroom {
        health: 2,
        ..mush(20, 8)
    });
    g.mushrooms.push(poisoned_mush(21, 9));

    g.lose_life();

    assert_eq!(g.lives, 2);
    assert!(g.respawning);
    assert_eq!(g.respawn_timer, RESPAWN_TICKS);
    assert!(g.bullets.is_empty());
    assert_eq!(g.player.pos, Position::new(25, 26));
    for m in &g.mushrooms {
        assert_eq!(m.health, 4);
        assert!(!m.poisoned);
    }
}

#[test]
fn last_life_ends_the_game() {
    let mut g = make_game();
    g.lives = 1;
    g.bullets.push(bullet(10, 5));

    g.lose_life();

    assert!(g.game_over);
    assert!(!g.respawning);
    // Terminal path skips the field reset
    assert_eq!(g.bullets.len(), 1);
}

#[test]
fn world_freezes_during_respawn() {
    let mut g = make_game();
    g.respawning = true;
    g.respawn_timer = 5;
    g.score = 100;
    g.bullets.push(bullet(10, 5));
    g.flies.push(fly(10, 8, 1));
    g.fleas.push(flea(12, 6));
    g.centipedes.push(creature(vec![seg(5, 2, 1)]));

    g.advance(&mut NeverRng);

    assert!(g.respawning);
    assert_eq!(g.respawn_timer, 4);
    assert_eq!(g.bullets[0].pos, Position::new(10, 5));
    assert_eq!(g.flies[0].pos, Position::new(10, 8));
    assert_eq!(g.fleas[0].pos, Position::new(12, 6));
    assert_eq!(g.centipedes[0].segments[0].pos, Position::new(5, 2));
    assert_eq!(g.score, 100);
}

#[test]
fn respawn_expiry_sweeps_the_safety_band() {
    let mut g = make_game();
    g.respawning = true;
    g.respawn_timer = 1;
    g.centipedes.push(creature(vec![seg(10, 20, 1)])); // inside rows ≥ 18
    g.centipedes.push(creature(vec![seg(10, 5, 1), seg(11, 5, 1)]));

    g.advance(&mut NeverRng);

    assert!(!g.respawning);
    assert_eq!(g.centipedes.len(), 1);
    assert_eq!(g.centipedes[0].len(), 2);
    assert_eq!(head_count(&g.centipedes[0]), 1);
}

#[test]
fn no_bonus_life_while_respawning() {
    let mut g = make_game();
    g.respawning = true;
    g.respawn_timer = 5;
    g.score = 20_000;
    g.advance(&mut NeverRng);
    assert_eq!(g.lives, 3);
}

#[test]
fn bonus_life_fires_once_per_threshold() {
    let mut g = make_game();
    g.centipedes.push(parked());
    g.score = 20_000;

    g.advance(&mut NeverRng);
    assert_eq!(g.lives, 4);
    assert_eq!(g.last_life_score, 20_000);

    g.advance(&mut NeverRng);
    assert_eq!(g.lives, 4); // same crossing never pays twice
}

#[test]
fn advance_is_a_noop_after_game_over() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1)]));
    g.bullets.push(bullet(10, 5));
    g.flies.push(fly(12, 6, 1));
    g.score = 1234;
    g.game_over = true;

    let before = g.clone();
    g.advance(&mut StdRng::seed_from_u64(9));
    assert_eq!(g, before);
}

#[test]
fn advance_is_a_noop_after_won() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1)]));
    g.won = true;

    let before = g.clone();
    g.advance(&mut StdRng::seed_from_u64(9));
    assert_eq!(g, before);
}

// ── Level progression ─────────────────────────────────────────────────────────

#[test]
fn clearing_the_wave_advances_the_level() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1)]));
    g.mushrooms.push(Mushroom {
        health: 1,
        ..mush(20, 8)
    });
    g.mushrooms.push(poisoned_mush(21, 9));
    g.bullets.push(bullet(6, 3));

    g.advance(&mut NeverRng);

    assert_eq!(g.level, 2);
    // New creature scales with the level it enters
    assert_eq!(g.segment_count(), 10 + 2 * 2);
    assert_eq!(head_count(&g.centipedes[0]), 1);
    // Ten fresh mushrooms, and the old field regrown and detoxified
    assert_eq!(g.mushrooms.len(), 12);
    for m in &g.mushrooms {
        assert_eq!(m.health, 4);
        assert!(!m.poisoned);
    }
}

// ── Snapshot rendering ────────────────────────────────────────────────────────

#[test]
fn render_grid_is_a_pure_read() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1), seg(6, 2, 1)]));
    g.mushrooms.push(mush(10, 5));
    g.bullets.push(bullet(12, 6));

    let before = g.clone();
    let first = g.render_grid();
    let second = g.render_grid();
    assert_eq!(g, before);
    assert_eq!(first, second);
}

#[test]
fn render_grid_glyphs_and_layering() {
    let mut g = make_game();
    g.centipedes.push(creature(vec![seg(5, 2, 1), seg(6, 2, 1)]));
    g.mushrooms.push(mush(10, 5));
    g.mushrooms.push(Mushroom {
        health: 3,
        ..mush(11, 5)
    });
    g.mushrooms.push(Mushroom {
        health: 2,
        ..mush(12, 5)
    });
    g.mushrooms.push(Mushroom {
        health: 1,
        ..mush(13, 5)
    });
    g.mushrooms.push(poisoned_mush(14, 5));
    g.bullets.push(bullet(10, 5)); // overwrites the mushroom cell
    g.explosions.push(Explosion::new(20, 20));

    let grid = g.render_grid();
    assert_eq!(grid[2][5], 'O');
    assert_eq!(grid[2][6], '@'); // head
    assert_eq!(grid[5][10], '|'); // bullet over mushroom
    assert_eq!(grid[5][11], 'm');
    assert_eq!(grid[5][12], '*');
    assert_eq!(grid[5][13], '.');
    assert_eq!(grid[5][14], 'X'); // poisoned
    assert_eq!(grid[20][20], '✶'); // explosion frame 0
    assert_eq!(grid[26][25], 'A'); // the gun, drawn last
}

#[test]
fn render_grid_hides_gun_while_respawning() {
    let mut g = make_game();
    g.respawning = true;
    let grid = g.render_grid();
    assert_eq!(grid[26][25], ' ');
}

#[test]
fn render_grid_draws_wing_trail_behind_fly() {
    let mut g = make_game();
    g.flies.push(Fly {
        wing_flap: true,
        ..fly(10, 5, 1)
    });
    let grid = g.render_grid();
    assert_eq!(grid[5][10], '✺');
    assert_eq!(grid[5][9], '~');
    assert_eq!(grid[5][8], '.');

    g.flies[0].wing_flap = false;
    let grid = g.render_grid();
    assert_eq!(grid[5][9], ' ');
}

// ── Long-run invariants ───────────────────────────────────────────────────────

#[test]
fn long_run_preserves_invariants() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut g = Game::new(50, 28, &mut rng);
    let mut last_score = 0;

    for tick in 0u32..600 {
        if tick % 3 == 0 {
            g.shoot();
        }
        if tick % 5 == 0 {
            g.move_x(1);
        } else if tick % 7 == 0 {
            g.move_x(-1);
        }
        if tick % 11 == 0 {
            g.move_y(-1);
        } else if tick % 13 == 0 {
            g.move_y(1);
        }

        g.advance(&mut rng);

        assert!(g.player.pos.x >= 1 && g.player.pos.x <= 48);
        assert!(g.player.pos.y >= 22 && g.player.pos.y <= 26);
        assert!(g.score >= last_score, "score must never decrease");
        last_score = g.score;
        assert!(!g.won, "level advance must always preempt winning");

        for m in &g.mushrooms {
            assert!((1..=4).contains(&m.health));
        }
        for c in &g.centipedes {
            assert_eq!(head_count(c), 1, "one head per creature");
        }

        if g.game_over {
            break;
        }
    }
}
