use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mic_types::{round_to, LedgerEntryId, MicReason, PrincipalId, TransactionId};
use serde::{Deserialize, Serialize};

/// A single immutable entry in the MIC ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    /// Global append position; strictly increasing across the whole ledger.
    pub sequence: u64,
    pub principal_id: PrincipalId,
    /// MIC amount, 2 decimals (positive = credit, negative = debit)
    pub amount: f64,
    pub reason: MicReason,
    /// Principal's integrity score at append time, 4 decimals
    pub integrity_score: f64,
    /// Global Integrity Index at append time, 4 decimals
    pub gii: Option<f64>,
    pub module_id: Option<String>,
    pub session_id: Option<String>,
    pub transaction_id: Option<TransactionId>,
    /// Opaque JSON object
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Input to [`crate::LedgerStore::append`].
#[derive(Clone, Debug)]
pub struct AppendRequest {
    pub principal_id: PrincipalId,
    pub amount: f64,
    pub reason: MicReason,
    pub integrity_score: f64,
    pub gii: Option<f64>,
    pub module_id: Option<String>,
    pub session_id: Option<String>,
    pub transaction_id: Option<TransactionId>,
    pub metadata: Option<serde_json::Value>,
}

impl AppendRequest {
    pub fn new(
        principal_id: impl Into<PrincipalId>,
        amount: f64,
        reason: MicReason,
        integrity_score: f64,
    ) -> Self {
        Self {
            principal_id: principal_id.into(),
            amount,
            reason,
            integrity_score,
            gii: None,
            module_id: None,
            session_id: None,
            transaction_id: None,
            metadata: None,
        }
    }

    pub fn with_gii(mut self, gii: f64) -> Self {
        self.gii = Some(gii);
        self
    }

    pub fn with_module(mut self, module_id: impl Into<String>) -> Self {
        self.module_id = Some(module_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_transaction(mut self, transaction_id: TransactionId) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One page of a principal's history, most recent first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerPage {
    /// Total entries for the principal at the time of the call
    pub total: usize,
    pub entries: Vec<LedgerEntry>,
}

/// Balance split by reason. `total` always equals the principal's balance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceBreakdown {
    #[serde(flatten)]
    pub by_reason: BTreeMap<MicReason, f64>,
    pub total: f64,
}

impl BalanceBreakdown {
    pub(crate) fn from_entries(entries: &[LedgerEntry]) -> Self {
        let mut by_reason: BTreeMap<MicReason, f64> = BTreeMap::new();
        let mut total = 0.0;
        for entry in entries {
            *by_reason.entry(entry.reason).or_insert(0.0) += entry.amount;
            total += entry.amount;
        }
        for subtotal in by_reason.values_mut() {
            *subtotal = round_to(*subtotal, 2);
        }
        Self {
            by_reason,
            total: round_to(total, 2),
        }
    }

    /// Subtotal for one reason; 0 when the principal has no such entries.
    pub fn subtotal(&self, reason: MicReason) -> f64 {
        self.by_reason.get(&reason).copied().unwrap_or(0.0)
    }

    /// Sum of the per-reason subtotals, at ledger precision.
    pub fn reason_sum(&self) -> f64 {
        round_to(self.by_reason.values().sum(), 2)
    }
}

/// Wallet view: derived balance plus the most recent activity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletSummary {
    pub principal_id: PrincipalId,
    pub balance: f64,
    pub last_updated: Option<DateTime<Utc>>,
    pub recent: Vec<LedgerEntry>,
}
