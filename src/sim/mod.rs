//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed-rate ticks only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{Aabb, first_hit, obstacle_hits_player};
pub use difficulty::{Difficulty, DifficultyProfile};
pub use progression::{LevelUp, Progression};
pub use spawn::{roll_obstacle, spawn_delay_ms, spawn_obstacle};
pub use state::{GameEvent, GameState, Obstacle, ObstacleShape, Player, Track};
pub use tick::{
    FallOutcome, activate_shield, advance_obstacle, fall_tick, heartbeat, motion_tick,
    toggle_pause,
};
pub use timers::{Firing, Scheduler, TimerKind};
