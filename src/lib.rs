//! Candy Dodge - A falling-candy dodging arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (difficulty, progression, spawning, collisions)
//! - `session`: Timer-driven play session and game-over commit
//! - `highscores`: Top-10 leaderboard
//! - `persistence`: Key-value storage backends
//! - `platform`: Input surface (holds, swipes, shield trigger)
//! - `settings`: Persisted player preferences
//! - `audio`: Event-to-sound cue mapping

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::{Leaderboard, LeaderboardEntry};
pub use session::{NamePrompt, RunSummary, Session};
pub use settings::Settings;
pub use sim::Difficulty;

/// Game configuration constants
pub mod consts {
    /// Player motion tick (~60 Hz)
    pub const MOTION_TICK_MS: u64 = 16;
    /// Obstacle fall/collision tick (50 Hz)
    pub const FALL_TICK_MS: u64 = 20;
    /// Score/time heartbeat (1 Hz)
    pub const HEARTBEAT_MS: u64 = 1000;
    /// Shield window after activation
    pub const SHIELD_DURATION_MS: u64 = 5000;
    /// Swipe-initiated movement auto-release
    pub const SWIPE_RELEASE_MS: u64 = 200;
    /// Largest slice of game time a single host frame may advance
    pub const MAX_FRAME_MS: u64 = 250;

    /// Track dimensions
    pub const DEFAULT_TRACK_WIDTH: f32 = 400.0;
    pub const TRACK_HEIGHT: f32 = 600.0;
    /// Obstacles whose top passes this line count as avoided
    pub const FLOOR_LINE: f32 = 600.0;

    /// Player hitbox
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    pub const PLAYER_Y: f32 = 530.0;
    /// Horizontal movement per motion tick
    pub const PLAYER_STEP: f32 = 5.0;

    /// Both axes must overlap by more than this to count as a hit
    pub const MIN_OVERLAP: f32 = 10.0;

    /// Spawn cadence
    pub const MIN_SPAWN_DELAY_MS: f64 = 30.0;
    pub const SPAWN_NOISE: f64 = 0.25;

    /// Fall speed (px per fall tick)
    pub const MIN_FALL_SPEED: f32 = 2.0;
    pub const MAX_FALL_SPEED: f32 = 40.0;
    pub const FALL_NOISE: f32 = 0.4;

    /// Bouncing obstacles
    pub const BOUNCE_CHANCE: f64 = 0.3;
    pub const BOUNCE_MIN_VX: f32 = 1.0;
    pub const BOUNCE_MAX_VX: f32 = 3.0;
    pub const BOUNCE_MIN_SPEED: f32 = 0.5;
    pub const BOUNCE_MAX_SPEED: f32 = 6.0;
    pub const BOUNCE_RESTITUTION_MIN: f32 = 0.7;
    pub const BOUNCE_RESTITUTION_MAX: f32 = 1.3;

    /// Scoring and experience
    pub const AVOID_SCORE: f64 = 10.0;
    pub const BOUNCING_AVOID_SCORE: f64 = 25.0;
    pub const AVOID_BASE_EXP: u32 = 5;
    pub const SHIELD_ABSORB_EXP: u32 = 20;

    /// Leaderboard
    pub const MAX_NAME_CHARS: usize = 12;
}
