//! Reward and estimate commands

use crate::error::{CliError, CliResult};
use crate::output::{print_json, print_success, print_warning, OutputFormat};
use clap::Args;
use mic_reward::{
    EstimateRequest, RewardEngine, RewardEstimate, RewardOutcome, RewardRequest,
};
use mic_types::{is_unit_interval, Difficulty};

#[derive(Debug, Args)]
pub struct RewardArgs {
    /// Module base reward
    #[arg(long)]
    pub base_reward: u32,

    /// Completion accuracy in [0, 1]
    #[arg(long)]
    pub accuracy: f64,

    /// Principal integrity score in [0, 1]
    #[arg(long)]
    pub integrity: f64,

    /// beginner, intermediate or advanced
    #[arg(long, default_value = "beginner")]
    pub difficulty: Difficulty,

    #[arg(long, default_value_t = 0)]
    pub streak_days: u32,

    /// Claim the perfect-score bonus (granted only at accuracy 1.0)
    #[arg(long)]
    pub perfect: bool,

    /// First completion of this module
    #[arg(long)]
    pub first: bool,

    /// Evaluate against this GII instead of the configured source
    #[arg(long)]
    pub gii: Option<f64>,
}

#[derive(Debug, Args)]
pub struct EstimateArgs {
    #[arg(long)]
    pub base_reward: u32,

    /// Expected accuracy in [0, 1]
    #[arg(long)]
    pub accuracy: f64,

    #[arg(long)]
    pub integrity: f64,

    #[arg(long, default_value = "beginner")]
    pub difficulty: Difficulty,

    #[arg(long, default_value_t = 0)]
    pub streak_days: u32,

    #[arg(long)]
    pub gii: Option<f64>,
}

fn resolve_gii(explicit: Option<f64>, engine: &RewardEngine) -> CliResult<f64> {
    match explicit {
        Some(gii) if !is_unit_interval(gii) => Err(CliError::InvalidInput(format!(
            "GII must be within [0, 1], got {gii}"
        ))),
        Some(gii) => Ok(gii),
        None => Ok(engine.current_gii()),
    }
}

pub fn calculate(args: &RewardArgs, engine: &RewardEngine) -> CliResult<RewardOutcome> {
    let gii = resolve_gii(args.gii, engine)?;
    let request = RewardRequest {
        base_reward: args.base_reward,
        accuracy: args.accuracy,
        integrity_score: args.integrity,
        difficulty: args.difficulty,
        streak_days: args.streak_days,
        is_perfect_score: args.perfect,
        is_first_completion: args.first,
    };
    Ok(engine.calculate_reward_with_gii(&request, gii))
}

pub fn estimate(args: &EstimateArgs, engine: &RewardEngine) -> CliResult<RewardEstimate> {
    let gii = resolve_gii(args.gii, engine)?;
    let request = EstimateRequest {
        base_reward: args.base_reward,
        expected_accuracy: args.accuracy,
        current_integrity_score: args.integrity,
        difficulty: args.difficulty,
        streak_days: args.streak_days,
    };
    Ok(engine.estimate_reward_with_gii(&request, gii))
}

pub fn execute_reward(
    args: RewardArgs,
    engine: &RewardEngine,
    format: OutputFormat,
) -> CliResult<()> {
    let outcome = calculate(&args, engine)?;
    if format == OutputFormat::Json {
        return print_json(&outcome);
    }

    match (&outcome.breakdown, outcome.rejection_reason()) {
        (Some(b), None) => {
            print_success(&format!(
                "{} MIC (system {}, GII {:.4})",
                outcome.mic_earned, outcome.system_status, outcome.gii
            ));
            println!(
                "  base {} x accuracy {:.4} x integrity {:.4} x gii {:.1} x difficulty {:.1} = {:.4}",
                b.base_reward,
                b.accuracy_multiplier,
                b.integrity_multiplier,
                b.gii_multiplier,
                b.difficulty_multiplier,
                b.base_mic
            );
            println!(
                "  bonuses: streak {:.0}%, perfect {:.0}%, first completion +{}",
                b.streak_bonus_fraction * 100.0,
                b.perfect_bonus_fraction * 100.0,
                b.first_completion_flat_bonus
            );
        }
        (_, reason) => {
            print_warning(&format!(
                "Not mintable: {}",
                reason.unwrap_or_else(|| "unknown".to_string())
            ));
        }
    }
    Ok(())
}

pub fn execute_estimate(
    args: EstimateArgs,
    engine: &RewardEngine,
    format: OutputFormat,
) -> CliResult<()> {
    let estimate = estimate(&args, engine)?;
    if format == OutputFormat::Json {
        return print_json(&estimate);
    }

    if estimate.can_mint {
        print_success(&format!(
            "~{} MIC (system {}, multiplier {:.1})",
            estimate.estimated_mic, estimate.system_status, estimate.gii_multiplier
        ));
    } else {
        print_warning(&format!(
            "Minting currently unavailable (system {}, integrity {:.2})",
            estimate.system_status, estimate.breakdown.integrity_score
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mic_reward::StaticHealthProvider;
    use mic_types::SystemHealth;
    use std::sync::Arc;

    fn engine() -> RewardEngine {
        RewardEngine::new(Arc::new(StaticHealthProvider::new(0.92)))
    }

    fn reward_args() -> RewardArgs {
        RewardArgs {
            base_reward: 100,
            accuracy: 0.95,
            integrity: 0.9,
            difficulty: Difficulty::Intermediate,
            streak_days: 7,
            perfect: false,
            first: true,
            gii: None,
        }
    }

    #[test]
    fn reward_uses_configured_gii() {
        let outcome = calculate(&reward_args(), &engine()).unwrap();
        // floor(100 * 0.95 * 0.9 * 1.0 * 1.2 * 1.10) + 20
        assert_eq!(outcome.mic_earned, 132);
        assert_eq!(outcome.system_status, SystemHealth::Healthy);
    }

    #[test]
    fn explicit_gii_overrides_provider() {
        let args = RewardArgs {
            gii: Some(0.7),
            ..reward_args()
        };
        let outcome = calculate(&args, &engine()).unwrap();
        assert_eq!(outcome.system_status, SystemHealth::Critical);
        assert_eq!(outcome.gii, 0.7);
    }

    #[test]
    fn estimate_omits_completion_bonuses() {
        let args = EstimateArgs {
            base_reward: 100,
            accuracy: 0.95,
            integrity: 0.9,
            difficulty: Difficulty::Intermediate,
            streak_days: 7,
            gii: None,
        };
        let estimate = estimate(&args, &engine()).unwrap();
        assert!(estimate.can_mint);
        assert_eq!(estimate.estimated_mic, 112);
    }

    #[test]
    fn invalid_gii_is_rejected() {
        let args = RewardArgs {
            gii: Some(f64::NAN),
            ..reward_args()
        };
        assert!(matches!(
            calculate(&args, &engine()),
            Err(CliError::InvalidInput(_))
        ));
    }
}
