//! Game state and core simulation types
//!
//! Everything one play session mutates lives here. A new session starts from
//! a fresh `GameState`; there is no in-place reset.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::difficulty::Difficulty;
use super::progression::Progression;
use crate::consts::*;

/// Visual shape of an obstacle (collision always uses the bounding box)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleShape {
    Square,
    Circle,
    Diamond,
    Triangle,
}

impl ObstacleShape {
    pub const ALL: [ObstacleShape; 4] = [
        ObstacleShape::Square,
        ObstacleShape::Circle,
        ObstacleShape::Diamond,
        ObstacleShape::Triangle,
    ];
}

/// Play-field dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub width: f32,
    pub height: f32,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            width: DEFAULT_TRACK_WIDTH,
            height: TRACK_HEIGHT,
        }
    }
}

impl Track {
    /// Track narrower than the player is widened to fit it
    pub fn new(width: f32) -> Self {
        Self {
            width: width.max(PLAYER_WIDTH),
            height: TRACK_HEIGHT,
        }
    }
}

/// The player's avatar
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Left edge
    pub x: f32,
}

impl Player {
    /// Centered on the track
    pub fn centered(track: &Track) -> Self {
        Self {
            x: (track.width - PLAYER_WIDTH) / 2.0,
        }
    }

    pub fn max_x(track: &Track) -> f32 {
        (track.width - PLAYER_WIDTH).max(0.0)
    }

    /// Move by `dx` and clamp to the track
    pub fn step(&mut self, dx: f32, track: &Track) {
        self.x = (self.x + dx).clamp(0.0, Self::max_x(track));
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_rect(
            Vec2::new(self.x, PLAYER_Y),
            Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
        )
    }
}

/// A falling obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    /// Edge length (obstacles are square)
    pub size: f32,
    pub shape: ObstacleShape,
    /// Pixels per fall tick, always > 0
    pub fall_speed: f32,
    pub bouncing: bool,
    /// Horizontal pixels per fall tick (0 unless bouncing)
    pub velocity_x: f32,
    pub bounce_count: u32,
}

impl Obstacle {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_rect(self.pos, Vec2::splat(self.size))
    }

    /// Rightmost valid `x` on the given track
    pub fn max_x(&self, track: &Track) -> f32 {
        (track.width - self.size).max(0.0)
    }

    /// True once the obstacle has fallen past the floor line
    pub fn is_past_floor(&self) -> bool {
        self.pos.y > FLOOR_LINE
    }
}

/// Notifications for presentation collaborators (render, audio, share).
/// The core never waits on their handling.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ObstacleSpawned {
        id: u32,
        bouncing: bool,
    },
    /// Non-shielded hit; always followed by `GameOver`
    Collision {
        id: u32,
        at: Vec2,
    },
    ShieldAbsorbed {
        id: u32,
        at: Vec2,
        exp: u32,
    },
    Avoided {
        id: u32,
        score: u64,
        exp: u32,
    },
    LevelUp {
        level: u32,
        shield_granted: bool,
    },
    ShieldActivated {
        charges_left: u32,
    },
    ShieldExpired,
    /// Obstacles removed without scoring at game over
    ObstaclesFlushed {
        count: usize,
    },
    Paused,
    Resumed,
    DifficultyChanged(Difficulty),
    GameOver {
        score: u64,
        elapsed_seconds: u32,
        level: u32,
        rank: Option<usize>,
    },
}

/// Complete game state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed this session's RNG was built from
    pub seed: u64,
    pub rng: Pcg32,
    /// Survival clock
    pub elapsed_seconds: u32,
    pub score: u64,
    pub is_over: bool,
    pub is_paused: bool,
    pub difficulty: Difficulty,
    pub progression: Progression,
    pub track: Track,
    pub player: Player,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Obstacles that passed the floor line
    pub avoided: u32,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, difficulty: Difficulty, track: Track) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            elapsed_seconds: 0,
            score: 0,
            is_over: false,
            is_paused: false,
            difficulty,
            progression: Progression::new(),
            player: Player::centered(&track),
            track,
            obstacles: Vec::new(),
            avoided: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Whether periodic payloads should run this firing
    pub fn is_running(&self) -> bool {
        !self.is_over && !self.is_paused
    }

    /// Overwrite the tier for all later formula evaluations.
    /// Ignored once the game is over.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.is_over || self.difficulty == difficulty {
            return false;
        }
        log::info!(
            "Difficulty {} -> {}",
            self.difficulty.as_str(),
            difficulty.as_str()
        );
        self.difficulty = difficulty;
        true
    }

    /// Apply experience and translate level-ups into events
    pub fn grant_exp(&mut self, amount: u32, events: &mut Vec<GameEvent>) {
        for up in self.progression.gain_exp(amount) {
            events.push(GameEvent::LevelUp {
                level: up.level,
                shield_granted: up.shield_granted,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(7, Difficulty::Normal, Track::default());
        assert_eq!(state.elapsed_seconds, 0);
        assert_eq!(state.score, 0);
        assert!(state.is_running());
        assert_eq!(state.progression.level, 1);
        assert_eq!(state.player.x, (DEFAULT_TRACK_WIDTH - PLAYER_WIDTH) / 2.0);
    }

    #[test]
    fn test_player_clamped_to_track() {
        let track = Track::new(300.0);
        let mut player = Player::centered(&track);
        player.step(-1_000.0, &track);
        assert_eq!(player.x, 0.0);
        player.step(1_000.0, &track);
        assert_eq!(player.x, 300.0 - PLAYER_WIDTH);
    }

    #[test]
    fn test_select_difficulty_blocked_after_game_over() {
        let mut state = GameState::new(7, Difficulty::Normal, Track::default());
        assert!(state.select_difficulty(Difficulty::Hard));
        assert_eq!(state.difficulty, Difficulty::Hard);
        assert!(!state.select_difficulty(Difficulty::Hard));

        state.is_over = true;
        assert!(!state.select_difficulty(Difficulty::Easy));
        assert_eq!(state.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_grant_exp_emits_level_ups() {
        let mut state = GameState::new(7, Difficulty::Normal, Track::default());
        let mut events = Vec::new();
        state.grant_exp(250, &mut events);
        assert_eq!(
            events,
            vec![
                GameEvent::LevelUp { level: 2, shield_granted: false },
                GameEvent::LevelUp { level: 3, shield_granted: true },
            ]
        );
    }
}
