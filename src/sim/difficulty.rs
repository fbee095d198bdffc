//! Difficulty tiers and their balance multipliers

use serde::{Deserialize, Serialize};

/// Preset difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

/// Multipliers applied by every time-dependent formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Applied to the spawn interval (lower = more frequent)
    pub spawn_rate: f64,
    /// Applied to obstacle fall speed
    pub fall_speed: f32,
    /// Applied to every score award
    pub score: f64,
    /// Extra heartbeat factor rewarding survival on the harder tiers
    pub survival_bonus: f64,
    /// Experience granted per heartbeat
    pub heartbeat_exp: u32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "insane" => Some(Difficulty::Insane),
            _ => None,
        }
    }

    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                spawn_rate: 1.5,
                fall_speed: 0.75,
                score: 0.8,
                survival_bonus: 1.0,
                heartbeat_exp: 2,
            },
            Difficulty::Normal => DifficultyProfile {
                spawn_rate: 1.0,
                fall_speed: 1.0,
                score: 1.0,
                survival_bonus: 1.0,
                heartbeat_exp: 2,
            },
            Difficulty::Hard => DifficultyProfile {
                spawn_rate: 0.75,
                fall_speed: 1.25,
                score: 1.5,
                survival_bonus: 1.2,
                heartbeat_exp: 3,
            },
            Difficulty::Insane => DifficultyProfile {
                spawn_rate: 0.5,
                fall_speed: 1.6,
                score: 2.0,
                survival_bonus: 1.5,
                heartbeat_exp: 5,
            },
        }
    }
}
