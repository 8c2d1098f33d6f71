use mic_types::{is_unit_interval, Difficulty};
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Reward and eligibility parameters.
///
/// Every field has a default, so a partial TOML table only overrides what it
/// names. The GII health bands are fixed and live in [`crate::health`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintingPolicy {
    /// Minimum principal integrity score
    #[serde(default = "default_min_integrity")]
    pub min_integrity: f64,

    /// Minimum completion accuracy; also the floor of the accuracy multiplier
    #[serde(default = "default_min_accuracy")]
    pub min_accuracy: f64,

    #[serde(default)]
    pub difficulty: DifficultyMultipliers,

    /// Streak tiers, ascending by days. Only the highest satisfied tier applies.
    #[serde(default = "default_streak_tiers")]
    pub streak_tiers: Vec<StreakTier>,

    /// Bonus fraction for a perfect score
    #[serde(default = "default_perfect_bonus")]
    pub perfect_bonus: f64,

    /// Flat MIC added on a principal's first completion of a module
    #[serde(default = "default_first_completion_bonus")]
    pub first_completion_bonus: u64,
}

impl Default for MintingPolicy {
    fn default() -> Self {
        Self {
            min_integrity: default_min_integrity(),
            min_accuracy: default_min_accuracy(),
            difficulty: DifficultyMultipliers::default(),
            streak_tiers: default_streak_tiers(),
            perfect_bonus: default_perfect_bonus(),
            first_completion_bonus: default_first_completion_bonus(),
        }
    }
}

/// Multiplier per module difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMultipliers {
    #[serde(default = "default_beginner")]
    pub beginner: f64,
    #[serde(default = "default_intermediate")]
    pub intermediate: f64,
    #[serde(default = "default_advanced")]
    pub advanced: f64,
}

impl Default for DifficultyMultipliers {
    fn default() -> Self {
        Self {
            beginner: default_beginner(),
            intermediate: default_intermediate(),
            advanced: default_advanced(),
        }
    }
}

impl DifficultyMultipliers {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Beginner => self.beginner,
            Difficulty::Intermediate => self.intermediate,
            Difficulty::Advanced => self.advanced,
        }
    }
}

/// Bonus fraction unlocked at `days` consecutive learning days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreakTier {
    pub days: u32,
    pub bonus: f64,
}

impl MintingPolicy {
    /// Bonus fraction of the highest tier `streak_days` satisfies (step, not cumulative).
    pub fn streak_bonus(&self, streak_days: u32) -> f64 {
        self.streak_tiers
            .iter()
            .filter(|tier| streak_days >= tier.days)
            .last()
            .map(|tier| tier.bonus)
            .unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        for (name, value) in [
            ("min_integrity", self.min_integrity),
            ("min_accuracy", self.min_accuracy),
        ] {
            if !is_unit_interval(value) {
                return Err(PolicyError::ThresholdOutOfRange { name, value });
            }
        }

        for (name, value) in [
            ("difficulty.beginner", self.difficulty.beginner),
            ("difficulty.intermediate", self.difficulty.intermediate),
            ("difficulty.advanced", self.difficulty.advanced),
            ("perfect_bonus", self.perfect_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PolicyError::InvalidMultiplier { name, value });
            }
        }

        for tier in &self.streak_tiers {
            if !tier.bonus.is_finite() || tier.bonus < 0.0 {
                return Err(PolicyError::InvalidMultiplier {
                    name: "streak_tiers.bonus",
                    value: tier.bonus,
                });
            }
        }
        for pair in self.streak_tiers.windows(2) {
            if pair[1].days <= pair[0].days {
                return Err(PolicyError::UnorderedStreakTiers {
                    previous: pair[0].days,
                    days: pair[1].days,
                });
            }
        }
        Ok(())
    }
}

fn default_min_integrity() -> f64 {
    0.70
}

fn default_min_accuracy() -> f64 {
    0.70
}

fn default_beginner() -> f64 {
    1.0
}

fn default_intermediate() -> f64 {
    1.2
}

fn default_advanced() -> f64 {
    1.5
}

fn default_streak_tiers() -> Vec<StreakTier> {
    vec![
        StreakTier { days: 3, bonus: 0.05 },
        StreakTier { days: 7, bonus: 0.10 },
        StreakTier { days: 14, bonus: 0.15 },
        StreakTier { days: 30, bonus: 0.25 },
    ]
}

fn default_perfect_bonus() -> f64 {
    0.10
}

fn default_first_completion_bonus() -> u64 {
    20
}
