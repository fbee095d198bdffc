//! Experience, levels and shield charges

/// Experience needed to leave level 1
pub const STARTING_MAX_EXP: u32 = 100;
/// Growth of the experience requirement per level
pub const MAX_EXP_GROWTH: f64 = 1.5;
/// Score multiplier gained per level
pub const MULTIPLIER_PER_LEVEL: f64 = 0.2;
/// Accuracy bonus gained per level (display only)
pub const ACCURACY_PER_LEVEL: u32 = 5;
/// A shield charge is granted on every level divisible by this
pub const SHIELD_LEVEL_INTERVAL: u32 = 3;

/// Result of a single level-up step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    /// Level reached
    pub level: u32,
    /// Whether this level granted a shield charge
    pub shield_granted: bool,
}

/// Player progression ledger
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub level: u32,
    pub current_exp: u32,
    pub max_exp: u32,
    pub score_multiplier: f64,
    pub accuracy_bonus: u32,
    pub shield_charges: u32,
    pub is_shielded: bool,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            current_exp: 0,
            max_exp: STARTING_MAX_EXP,
            score_multiplier: 1.0,
            accuracy_bonus: 0,
            shield_charges: 0,
            is_shielded: false,
        }
    }
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add experience, levelling up as many times as the total allows.
    ///
    /// Always leaves `current_exp < max_exp`.
    pub fn gain_exp(&mut self, amount: u32) -> Vec<LevelUp> {
        self.current_exp = self.current_exp.saturating_add(amount);

        let mut level_ups = Vec::new();
        while self.current_exp >= self.max_exp {
            level_ups.push(self.level_up());
        }
        level_ups
    }

    fn level_up(&mut self) -> LevelUp {
        self.current_exp -= self.max_exp;
        self.level += 1;
        self.max_exp = (self.max_exp as f64 * MAX_EXP_GROWTH).floor() as u32;

        self.accuracy_bonus += ACCURACY_PER_LEVEL;
        self.score_multiplier += MULTIPLIER_PER_LEVEL;

        let shield_granted = self.level.is_multiple_of(SHIELD_LEVEL_INTERVAL);
        if shield_granted {
            self.shield_charges += 1;
        }

        log::info!(
            "Level up -> {} (next at {} exp, x{:.1} score)",
            self.level,
            self.max_exp,
            self.score_multiplier
        );

        LevelUp {
            level: self.level,
            shield_granted,
        }
    }

    /// Spend a shield charge. Returns false (and changes nothing) when no
    /// charge is available or a shield window is already open.
    pub fn use_shield(&mut self) -> bool {
        if self.shield_charges == 0 || self.is_shielded {
            return false;
        }
        self.shield_charges -= 1;
        self.is_shielded = true;
        true
    }

    /// Close the active shield window
    pub fn expire_shield(&mut self) {
        self.is_shielded = false;
    }

    /// Fraction of the current level's experience bar that is filled
    pub fn exp_fraction(&self) -> f32 {
        self.current_exp as f32 / self.max_exp as f32
    }

    /// Floor of `base` scaled by the level multiplier and `extra`
    pub fn scaled_score(&self, base: f64, extra: f64) -> u64 {
        // absorb float drift from the accumulated 0.2 steps
        (base * self.score_multiplier * extra + 1e-9).floor().max(0.0) as u64
    }
}
