use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Canonical identity that owns a ledger balance.
///
/// Opaque and already authenticated by the caller; never validated here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub String);

/// Identifier of a single ledger entry: `mic_ledger_<12 hex>_<unix secs>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerEntryId(pub String);

/// Identifier of a mint transaction: `tx_mic_<12 hex>_<unix secs>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl LedgerEntryId {
    pub fn generate() -> Self {
        Self(tagged_id("mic_ledger"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TransactionId {
    pub fn generate() -> Self {
        Self(tagged_id("tx_mic"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn tagged_id(prefix: &str) -> String {
    let entropy = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, &entropy[..12], Utc::now().timestamp())
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PrincipalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for LedgerEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
