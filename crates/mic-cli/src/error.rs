//! CLI error types

use mic_ledger::LedgerError;
use mic_minting::MintError;
use mic_receipt::ReceiptError;
use mic_reward::PolicyError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Minting policy failed validation
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Receipt did not verify
    #[error("Receipt error: {0}")]
    Receipt(#[from] ReceiptError),

    #[error("Mint error: {0}")]
    Mint(#[from] MintError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
