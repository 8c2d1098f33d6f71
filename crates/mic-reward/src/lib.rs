//! # mic-reward
//!
//! Decides whether a learning completion may mint MIC, and how much.
//!
//! - **Health**: system health is a pure function of the Global Integrity
//!   Index (GII). Below the circuit-breaker floor minting is disabled for
//!   everyone, regardless of individual standing.
//! - **Gates**: GII, the principal's integrity score and the completion
//!   accuracy must all clear their floors. A rejection lists every gate that
//!   failed, not just the first.
//! - **Reward**: `floor(base · Π multipliers · (1 + Σ bonus fractions)) + flat
//!   bonus`, with every factor surfaced in the breakdown.
//!
//! The current GII comes from an injected [`HealthProvider`]; the engine holds
//! no global state and every computation is also available with an explicit
//! GII.

pub mod engine;
pub mod error;
pub mod gate;
pub mod health;
pub mod policy;

pub use engine::{
    EstimateBreakdown, EstimateRequest, RewardBreakdown, RewardEngine, RewardEstimate,
    RewardOutcome, RewardRequest,
};
pub use error::PolicyError;
pub use gate::{describe, evaluate_gates, Gate, GateFailure};
pub use health::{
    classify, EnvHealthProvider, HealthAssessment, HealthProvider, SharedHealthProvider,
    StaticHealthProvider, CIRCUIT_BREAKER_FLOOR, GII_OVERRIDE_ENV,
};
pub use policy::{DifficultyMultipliers, MintingPolicy, StreakTier};
