use thiserror::Error;

/// Errors from the MIC ledger.
///
/// An unknown principal is not an error: it has an empty history and a zero
/// balance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid ledger entry: {field} {reason}")]
    InvalidEntry { field: &'static str, reason: String },
}

impl LedgerError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidEntry {
            field,
            reason: reason.into(),
        }
    }
}
