use mic_ledger::LedgerError;
use mic_receipt::ReceiptError;
use mic_reward::{describe, GateFailure};
use thiserror::Error;

/// Minting errors.
#[derive(Debug, Error)]
pub enum MintError {
    /// Eligibility gates failed at commit time
    #[error("mint not permitted: {}", describe(.failures))]
    Ineligible { failures: Vec<GateFailure> },

    #[error("invalid mint amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("receipt error: {0}")]
    Receipt(#[from] ReceiptError),
}

impl MintError {
    /// Gate failures, if this is an ineligibility rejection.
    pub fn failures(&self) -> &[GateFailure] {
        match self {
            MintError::Ineligible { failures } => failures,
            _ => &[],
        }
    }
}
