/// All game entity types — pure data, no logic.

/// An integer grid cell.  Origin top-left, X increasing right, Y down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

/// The player's gun.  Confined to the bottom band of the board.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: Position,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub pos: Position,
    pub active: bool,
}

// ── Centipede ─────────────────────────────────────────────────────────────────

/// One cell of a centipede.  `direction` is +1 (right) or -1 (left).
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub pos: Position,
    pub direction: i32,
    pub is_head: bool,
}

/// One centipede creature: an ordered sequence of segments.  The last
/// segment in the sequence is the head; `promote_head` restores that
/// marking after any removal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Centipede {
    pub segments: Vec<Segment>,
}

impl Centipede {
    /// Build a creature of `length` segments laid out left to right from
    /// `(start_x, start_y)`, all moving in `direction`.
    pub fn new(start_x: i32, start_y: i32, length: usize, direction: i32) -> Self {
        let segments = (0..length)
            .map(|i| Segment {
                pos: Position::new(start_x + i as i32, start_y),
                direction,
                is_head: i + 1 == length,
            })
            .collect();
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Re-mark the head: exactly one per non-empty creature, always the
    /// last segment of the sequence.
    pub fn promote_head(&mut self) {
        for seg in &mut self.segments {
            seg.is_head = false;
        }
        if let Some(front) = self.segments.last_mut() {
            front.is_head = true;
        }
    }
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

/// Destructible obstacle.  Health runs 4 down to 1; reaching 0 removes it.
/// A poisoned mushroom sends centipede segments down a three-row chute.
#[derive(Clone, Debug, PartialEq)]
pub struct Mushroom {
    pub pos: Position,
    pub health: i32,
    pub poisoned: bool,
}

impl Mushroom {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            pos: Position::new(x, y),
            health: 4,
            poisoned: false,
        }
    }
}

// ── Secondary enemies ─────────────────────────────────────────────────────────

/// Horizontal flyer.  Poisons any mushroom it lands on.
#[derive(Clone, Debug, PartialEq)]
pub struct Fly {
    pub pos: Position,
    pub direction: i32,
    pub active: bool,
    /// Alternates every tick; drives the wing-trail animation.
    pub wing_flap: bool,
}

/// Falls straight down from the top, seeding mushrooms on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct Flea {
    pub pos: Position,
    pub active: bool,
}

// ── Effects ───────────────────────────────────────────────────────────────────

/// Purely visual, time-limited blast marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub pos: Position,
    pub frame: i32,
    pub max_frame: i32,
    pub active: bool,
}

impl Explosion {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            pos: Position::new(x, y),
            frame: 0,
            max_frame: 4,
            active: true,
        }
    }

    /// Glyph for the current animation frame.
    pub fn glyph(&self) -> char {
        match self.frame {
            0 => '✶',
            1 => '✸',
            2 => '✹',
            3 => '✺',
            _ => ' ',
        }
    }
}
