use mic_types::is_unit_interval;
use serde::{Deserialize, Serialize};

use crate::health::CIRCUIT_BREAKER_FLOOR;
use crate::policy::MintingPolicy;

/// An eligibility gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// Global Integrity Index above the circuit-breaker floor
    SystemIntegrity,
    /// Principal's own integrity score
    UserIntegrity,
    /// Completion accuracy
    Accuracy,
}

/// One unmet gate, with the observed and required values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateFailure {
    pub gate: Gate,
    pub observed: f64,
    pub required: f64,
}

impl std::fmt::Display for GateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.gate {
            Gate::SystemIntegrity => write!(
                f,
                "System integrity too low (GII: {:.2}, required: {:.2})",
                self.observed, self.required
            ),
            Gate::UserIntegrity => write!(
                f,
                "User integrity score too low ({:.2}, required: {:.2})",
                self.observed, self.required
            ),
            Gate::Accuracy => write!(
                f,
                "Accuracy too low ({:.2}%, required: {:.0}%)",
                self.observed * 100.0,
                self.required * 100.0
            ),
        }
    }
}

/// Check every gate and return all failures, in gate order.
///
/// A value outside `[0, 1]` (or NaN) never clears its gate. An empty result
/// means minting is permitted.
pub fn evaluate_gates(
    policy: &MintingPolicy,
    gii: f64,
    integrity_score: f64,
    accuracy: f64,
) -> Vec<GateFailure> {
    let checks = [
        (Gate::SystemIntegrity, gii, CIRCUIT_BREAKER_FLOOR),
        (Gate::UserIntegrity, integrity_score, policy.min_integrity),
        (Gate::Accuracy, accuracy, policy.min_accuracy),
    ];

    checks
        .into_iter()
        .filter(|(_, observed, required)| !(is_unit_interval(*observed) && observed >= required))
        .map(|(gate, observed, required)| GateFailure {
            gate,
            observed,
            required,
        })
        .collect()
}

/// Human-readable rendering of a rejection, `"; "`-joined.
pub fn describe(failures: &[GateFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
