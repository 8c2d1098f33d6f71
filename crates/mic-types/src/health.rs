use serde::{Deserialize, Serialize};

/// System health derived from the Global Integrity Index.
///
/// Ordered from best to worst so `>=` comparisons read as "at least this bad".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemHealth {
    Healthy,
    Warning,
    Critical,
    CircuitBreakerActive,
}

impl SystemHealth {
    /// Whether minting is globally permitted in this state.
    pub fn allows_minting(&self) -> bool {
        !matches!(self, SystemHealth::CircuitBreakerActive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemHealth::Healthy => "healthy",
            SystemHealth::Warning => "warning",
            SystemHealth::Critical => "critical",
            SystemHealth::CircuitBreakerActive => "circuit_breaker_active",
        }
    }
}

impl std::fmt::Display for SystemHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
