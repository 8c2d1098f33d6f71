//! # mic-minting
//!
//! Ties reward gating, receipts and the ledger into one mint operation.
//!
//! Eligibility is re-checked against the current GII when a mint commits, so
//! an estimate computed under healthier conditions cannot be redeemed after
//! the system degrades. A successful mint appends exactly one `LEARN` entry
//! whose metadata links to a verified receipt.

#![deny(unsafe_code)]

pub mod error;
pub mod orchestrator;

pub use error::MintError;
pub use orchestrator::{
    CompletionOutcome, CompletionRequest, MintOutcome, MintRequest, MintingOrchestrator,
};
