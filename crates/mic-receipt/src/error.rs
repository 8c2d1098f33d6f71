use thiserror::Error;

/// Receipt verification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    /// Recomputed hash differs from the one the receipt carries
    #[error("receipt hash mismatch: expected {expected}, found {actual}")]
    HashMismatch { expected: String, actual: String },
}
