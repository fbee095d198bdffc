//! Input surface
//!
//! Keyboard and on-screen buttons produce hold/release signals. Touch swipes
//! longer than `SWIPE_MIN_DISTANCE` are classified by their dominant axis:
//! horizontal swipes hold a direction briefly, vertical swipes (and
//! two-finger taps) trigger the shield.

/// Horizontal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// -1 for left, 1 for right
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// Minimum swipe travel (px) along the dominant axis
pub const SWIPE_MIN_DISTANCE: f32 = 30.0;

/// What a completed touch gesture means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Short horizontal hold
    Move(Direction),
    /// Shield trigger
    Shield,
    /// Too short to count
    None,
}

/// Classify a swipe from its start-to-end delta (screen coords, y down)
pub fn classify_swipe(dx: f32, dy: f32) -> Gesture {
    if dx.abs() >= dy.abs() {
        if dx.abs() > SWIPE_MIN_DISTANCE {
            return Gesture::Move(if dx < 0.0 {
                Direction::Left
            } else {
                Direction::Right
            });
        }
    } else if dy.abs() > SWIPE_MIN_DISTANCE {
        return Gesture::Shield;
    }
    Gesture::None
}

/// Held directions. Keys and swipes hold independently; a swipe hold is
/// cleared by its auto-release timer.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    swipe: Option<Direction>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.left = true,
            Direction::Right => self.right = true,
        }
    }

    pub fn release(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.left = false,
            Direction::Right => self.right = false,
        }
    }

    /// Start a swipe hold, replacing any earlier one
    pub fn hold_swipe(&mut self, dir: Direction) {
        self.swipe = Some(dir);
    }

    pub fn release_swipe(&mut self) {
        self.swipe = None;
    }

    pub fn swipe_hold(&self) -> Option<Direction> {
        self.swipe
    }

    /// Drop every hold (focus loss)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Net horizontal intent: -1, 0 or 1. Opposite holds cancel.
    pub fn direction(&self) -> f32 {
        let left = self.left || self.swipe == Some(Direction::Left);
        let right = self.right || self.swipe == Some(Direction::Right);
        match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}
