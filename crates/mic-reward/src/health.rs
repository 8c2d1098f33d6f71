use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mic_types::SystemHealth;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// GII below this disables minting entirely.
pub const CIRCUIT_BREAKER_FLOOR: f64 = 0.60;

const HEALTHY_FLOOR: f64 = 0.90;
const WARNING_FLOOR: f64 = 0.75;

/// Environment variable that pins the GII, for testing and drills.
pub const GII_OVERRIDE_ENV: &str = "MIC_GII_OVERRIDE";

/// Health state and the reward multiplier it implies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub status: SystemHealth,
    pub multiplier: f64,
}

/// Map a GII to system health.
///
/// ```text
/// GII ≥ 0.90          HEALTHY                 1.0
/// 0.75 ≤ GII < 0.90   WARNING                 0.8
/// 0.60 ≤ GII < 0.75   CRITICAL                0.5
/// GII < 0.60          CIRCUIT_BREAKER_ACTIVE  0.0
/// ```
///
/// A non-finite GII trips the breaker.
pub fn classify(gii: f64) -> HealthAssessment {
    let (status, multiplier) = if !gii.is_finite() || gii < CIRCUIT_BREAKER_FLOOR {
        (SystemHealth::CircuitBreakerActive, 0.0)
    } else if gii >= HEALTHY_FLOOR {
        (SystemHealth::Healthy, 1.0)
    } else if gii >= WARNING_FLOOR {
        (SystemHealth::Warning, 0.8)
    } else {
        (SystemHealth::Critical, 0.5)
    };
    HealthAssessment { status, multiplier }
}

/// Source of the current Global Integrity Index.
///
/// The value is refreshed by an external monitoring collaborator; no
/// staleness contract is imposed here.
pub trait HealthProvider: Send + Sync {
    fn current_gii(&self) -> f64;
}

/// Fixed GII.
#[derive(Clone, Copy, Debug)]
pub struct StaticHealthProvider {
    gii: f64,
}

impl StaticHealthProvider {
    /// Healthy default used when no monitor is wired in.
    pub const DEFAULT_GII: f64 = 0.92;

    pub fn new(gii: f64) -> Self {
        Self { gii }
    }
}

impl Default for StaticHealthProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GII)
    }
}

impl HealthProvider for StaticHealthProvider {
    fn current_gii(&self) -> f64 {
        self.gii
    }
}

/// GII that a monitor can update while minting is in progress.
#[derive(Debug)]
pub struct SharedHealthProvider {
    bits: AtomicU64,
}

impl SharedHealthProvider {
    pub fn new(gii: f64) -> Self {
        Self {
            bits: AtomicU64::new(gii.to_bits()),
        }
    }

    pub fn set(&self, gii: f64) {
        let previous = f64::from_bits(self.bits.swap(gii.to_bits(), Ordering::SeqCst));
        let before = classify(previous).status;
        let after = classify(gii).status;
        if before != after {
            if after == SystemHealth::CircuitBreakerActive {
                warn!(gii, previous, "Circuit breaker activated");
            } else {
                debug!(gii, previous, status = %after, "System health changed");
            }
        }
    }
}

impl HealthProvider for SharedHealthProvider {
    fn current_gii(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// Reads [`GII_OVERRIDE_ENV`] on every call, falling back to another provider
/// when it is unset or unparsable.
pub struct EnvHealthProvider {
    var: String,
    fallback: Arc<dyn HealthProvider>,
}

impl EnvHealthProvider {
    pub fn new(fallback: Arc<dyn HealthProvider>) -> Self {
        Self::with_var(GII_OVERRIDE_ENV, fallback)
    }

    pub fn with_var(var: impl Into<String>, fallback: Arc<dyn HealthProvider>) -> Self {
        Self {
            var: var.into(),
            fallback,
        }
    }
}

impl HealthProvider for EnvHealthProvider {
    fn current_gii(&self) -> f64 {
        match std::env::var(&self.var) {
            Ok(raw) => match raw.trim().parse::<f64>() {
                Ok(gii) => gii,
                Err(_) => {
                    warn!(var = %self.var, value = %raw, "Ignoring unparsable GII override");
                    self.fallback.current_gii()
                }
            },
            Err(_) => self.fallback.current_gii(),
        }
    }
}
