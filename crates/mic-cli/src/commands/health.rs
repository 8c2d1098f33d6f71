//! Health command

use crate::error::{CliError, CliResult};
use crate::output::{print_json, print_success, print_warning, OutputFormat};
use clap::Args;
use mic_reward::{classify, RewardEngine};
use mic_types::{is_unit_interval, SystemHealth};
use serde::Serialize;

#[derive(Debug, Args)]
pub struct HealthArgs {
    /// GII to classify (defaults to the configured source)
    pub gii: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub gii: f64,
    pub status: SystemHealth,
    pub multiplier: f64,
    pub minting_allowed: bool,
}

pub fn evaluate(args: &HealthArgs, engine: &RewardEngine) -> CliResult<HealthReport> {
    let gii = match args.gii {
        Some(gii) if !is_unit_interval(gii) => {
            return Err(CliError::InvalidInput(format!(
                "GII must be within [0, 1], got {gii}"
            )))
        }
        Some(gii) => gii,
        None => engine.current_gii(),
    };
    let assessment = classify(gii);
    Ok(HealthReport {
        gii,
        status: assessment.status,
        multiplier: assessment.multiplier,
        minting_allowed: assessment.status.allows_minting(),
    })
}

pub fn execute(args: HealthArgs, engine: &RewardEngine, format: OutputFormat) -> CliResult<()> {
    let report = evaluate(&args, engine)?;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            let line = format!(
                "GII {:.4}: {} (reward multiplier {:.1})",
                report.gii, report.status, report.multiplier
            );
            if report.minting_allowed {
                print_success(&line);
            } else {
                print_warning(&format!("{line}, minting disabled"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mic_reward::StaticHealthProvider;
    use std::sync::Arc;

    fn engine(gii: f64) -> RewardEngine {
        RewardEngine::new(Arc::new(StaticHealthProvider::new(gii)))
    }

    #[test]
    fn explicit_gii_is_classified() {
        let report = evaluate(&HealthArgs { gii: Some(0.8) }, &engine(0.95)).unwrap();
        assert_eq!(report.status, SystemHealth::Warning);
        assert_eq!(report.multiplier, 0.8);
        assert!(report.minting_allowed);
    }

    #[test]
    fn provider_gii_is_used_by_default() {
        let report = evaluate(&HealthArgs { gii: None }, &engine(0.59)).unwrap();
        assert_eq!(report.gii, 0.59);
        assert_eq!(report.status, SystemHealth::CircuitBreakerActive);
        assert!(!report.minting_allowed);
    }

    #[test]
    fn out_of_range_gii_is_invalid_input() {
        assert!(matches!(
            evaluate(&HealthArgs { gii: Some(1.2) }, &engine(0.95)),
            Err(CliError::InvalidInput(_))
        ));
    }
}
