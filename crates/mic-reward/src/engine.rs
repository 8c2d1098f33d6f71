use std::sync::Arc;

use mic_types::{Difficulty, SystemHealth};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PolicyError;
use crate::gate::{describe, evaluate_gates, GateFailure};
use crate::health::{classify, HealthAssessment, HealthProvider};
use crate::policy::MintingPolicy;

/// Completion metrics for a reward calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardRequest {
    /// Module's base MIC reward
    pub base_reward: u32,
    /// Completion accuracy in [0, 1]
    pub accuracy: f64,
    /// Principal's integrity score in [0, 1]
    pub integrity_score: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub is_perfect_score: bool,
    #[serde(default)]
    pub is_first_completion: bool,
}

/// Every factor that went into a minted amount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub base_reward: u32,
    pub accuracy_multiplier: f64,
    pub integrity_multiplier: f64,
    pub gii_multiplier: f64,
    pub difficulty_multiplier: f64,
    /// `base_reward` times all multipliers, before bonuses
    pub base_mic: f64,
    pub streak_bonus_fraction: f64,
    pub perfect_bonus_fraction: f64,
    pub first_completion_flat_bonus: u64,
}

/// Result of [`RewardEngine::calculate_reward`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardOutcome {
    pub mic_earned: u64,
    pub can_mint: bool,
    pub system_status: SystemHealth,
    pub gii: f64,
    /// Present only when minting is permitted
    pub breakdown: Option<RewardBreakdown>,
    /// Every unmet gate; empty when minting is permitted
    pub rejections: Vec<GateFailure>,
}

impl RewardOutcome {
    pub fn rejection_reason(&self) -> Option<String> {
        if self.rejections.is_empty() {
            None
        } else {
            Some(describe(&self.rejections))
        }
    }
}

/// Inputs for a pre-completion estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub base_reward: u32,
    pub expected_accuracy: f64,
    pub current_integrity_score: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub streak_days: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateBreakdown {
    pub base_reward: u32,
    pub accuracy_assumption: f64,
    pub accuracy_multiplier: f64,
    pub integrity_score: f64,
    pub gii: f64,
    pub difficulty_multiplier: f64,
    pub streak_bonus_fraction: f64,
}

/// Result of [`RewardEngine::estimate_reward`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardEstimate {
    pub estimated_mic: u64,
    /// GII and integrity only; accuracy is unknown before completion
    pub can_mint: bool,
    pub system_status: SystemHealth,
    pub gii_multiplier: f64,
    pub breakdown: EstimateBreakdown,
}

/// Reward engine.
///
/// Stateless apart from its policy: the GII is read from the injected
/// [`HealthProvider`] at call time, and every calculation has a `*_with_gii`
/// variant that takes the GII explicitly.
pub struct RewardEngine {
    policy: MintingPolicy,
    health: Arc<dyn HealthProvider>,
}

impl RewardEngine {
    /// Engine with the default policy.
    pub fn new(health: Arc<dyn HealthProvider>) -> Self {
        Self {
            policy: MintingPolicy::default(),
            health,
        }
    }

    /// Engine with a custom policy, validated up front.
    pub fn with_policy(
        policy: MintingPolicy,
        health: Arc<dyn HealthProvider>,
    ) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { policy, health })
    }

    pub fn policy(&self) -> &MintingPolicy {
        &self.policy
    }

    pub fn current_gii(&self) -> f64 {
        self.health.current_gii()
    }

    /// Current system health from the provider.
    pub fn health(&self) -> (f64, HealthAssessment) {
        let gii = self.current_gii();
        (gii, classify(gii))
    }

    /// All unmet gates for the given values; empty means mintable.
    pub fn gate(&self, gii: f64, integrity_score: f64, accuracy: f64) -> Vec<GateFailure> {
        evaluate_gates(&self.policy, gii, integrity_score, accuracy)
    }

    pub fn calculate_reward(&self, request: &RewardRequest) -> RewardOutcome {
        self.calculate_reward_with_gii(request, self.current_gii())
    }

    pub fn calculate_reward_with_gii(&self, request: &RewardRequest, gii: f64) -> RewardOutcome {
        let health = classify(gii);
        let rejections = self.gate(gii, request.integrity_score, request.accuracy);

        if !rejections.is_empty() {
            warn!(
                gii,
                status = %health.status,
                reason = %describe(&rejections),
                "Reward rejected by eligibility gates"
            );
            return RewardOutcome {
                mic_earned: 0,
                can_mint: false,
                system_status: health.status,
                gii,
                breakdown: None,
                rejections,
            };
        }

        let accuracy_multiplier = request.accuracy.max(self.policy.min_accuracy);
        let difficulty_multiplier = self.policy.difficulty.for_difficulty(request.difficulty);
        let base_mic = f64::from(request.base_reward)
            * accuracy_multiplier
            * request.integrity_score
            * health.multiplier
            * difficulty_multiplier;

        let streak_bonus_fraction = self.policy.streak_bonus(request.streak_days);
        let perfect_bonus_fraction = if request.is_perfect_score && request.accuracy >= 1.0 {
            self.policy.perfect_bonus
        } else {
            0.0
        };
        let first_completion_flat_bonus = if request.is_first_completion {
            self.policy.first_completion_bonus
        } else {
            0
        };

        let scaled = base_mic * (1.0 + streak_bonus_fraction + perfect_bonus_fraction);
        let mic_earned = scaled.floor() as u64 + first_completion_flat_bonus;

        debug!(
            gii,
            status = %health.status,
            base_mic,
            mic_earned,
            "Reward calculated"
        );

        RewardOutcome {
            mic_earned,
            can_mint: true,
            system_status: health.status,
            gii,
            breakdown: Some(RewardBreakdown {
                base_reward: request.base_reward,
                accuracy_multiplier,
                integrity_multiplier: request.integrity_score,
                gii_multiplier: health.multiplier,
                difficulty_multiplier,
                base_mic,
                streak_bonus_fraction,
                perfect_bonus_fraction,
                first_completion_flat_bonus,
            }),
            rejections: Vec::new(),
        }
    }

    pub fn estimate_reward(&self, request: &EstimateRequest) -> RewardEstimate {
        self.estimate_reward_with_gii(request, self.current_gii())
    }

    /// Estimate with the same tables as [`Self::calculate_reward_with_gii`],
    /// minus the perfect-score and first-completion bonuses.
    ///
    /// An estimate that could not be minted is reported as 0.
    pub fn estimate_reward_with_gii(&self, request: &EstimateRequest, gii: f64) -> RewardEstimate {
        let health = classify(gii);
        // Accuracy is unknown before completion, so only GII and integrity gate.
        let can_mint = self
            .gate(gii, request.current_integrity_score, 1.0)
            .is_empty();

        let accuracy_multiplier = request.expected_accuracy.max(self.policy.min_accuracy);
        let difficulty_multiplier = self.policy.difficulty.for_difficulty(request.difficulty);
        let streak_bonus_fraction = self.policy.streak_bonus(request.streak_days);

        let estimated_mic = if can_mint {
            let base_mic = f64::from(request.base_reward)
                * accuracy_multiplier
                * request.current_integrity_score
                * health.multiplier
                * difficulty_multiplier;
            (base_mic * (1.0 + streak_bonus_fraction)).floor() as u64
        } else {
            0
        };

        RewardEstimate {
            estimated_mic,
            can_mint,
            system_status: health.status,
            gii_multiplier: health.multiplier,
            breakdown: EstimateBreakdown {
                base_reward: request.base_reward,
                accuracy_assumption: request.expected_accuracy,
                accuracy_multiplier,
                integrity_score: request.current_integrity_score,
                gii,
                difficulty_multiplier,
                streak_bonus_fraction,
            },
        }
    }
}
