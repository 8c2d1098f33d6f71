//! Core type definitions for the MIC minting ledger.
//!
//! This crate provides the shared identifiers and closed enumerations used by
//! the ledger, the reward engine, the receipt generator and the orchestrator.
//! No business logic, only types and the rounding contract they share.

pub mod difficulty;
pub mod health;
pub mod ids;
pub mod numeric;
pub mod reason;

pub use difficulty::Difficulty;
pub use health::SystemHealth;
pub use ids::{LedgerEntryId, PrincipalId, TransactionId};
pub use numeric::{is_unit_interval, round_to};
pub use reason::MicReason;

use thiserror::Error;

/// Error returned when parsing one of the closed enumerations from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
