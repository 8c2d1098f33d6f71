//! # mic-ledger
//!
//! Append-only record of MIC movements per principal.
//!
//! - The ledger is the single source of truth for MIC balances. A balance is
//!   never stored; it is the sum of a principal's entries, recomputed on read.
//! - Entries are immutable once appended. There is no update or delete path.
//! - Only structural validity is checked here. Negative balances are allowed
//!   (corrections); mint eligibility lives in the reward engine.
//!
//! [`LedgerStore`] is the seam a durable append-only log can be substituted
//! behind. [`InMemoryLedgerStore`] is the authoritative in-memory
//! implementation: per-principal sequences are sharded so appends for one
//! principal serialize while different principals proceed in parallel.

#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use error::LedgerError;
pub use memory::InMemoryLedgerStore;
pub use store::LedgerStore;
pub use types::{AppendRequest, BalanceBreakdown, LedgerEntry, LedgerPage, WalletSummary};
