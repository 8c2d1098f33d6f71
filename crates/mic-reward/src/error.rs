use thiserror::Error;

/// Errors from validating a [`crate::MintingPolicy`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("threshold {name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("multiplier {name} must be finite and non-negative, got {value}")]
    InvalidMultiplier { name: &'static str, value: f64 },

    #[error("streak tiers must be strictly increasing in days: {days} follows {previous}")]
    UnorderedStreakTiers { previous: u32, days: u32 },
}
