//! # mic-receipt
//!
//! Tamper-evident receipts for MIC mint events.
//!
//! A receipt hash is SHA-256 over the canonical JSON form of the receipt's
//! fields: keys sorted, no whitespace. Canonicalization depends on field
//! values only, never on construction order, so anyone holding the receipt
//! can recompute and compare the hash.
//!
//! Numeric fields are rounded before hashing (minted amount to 2 decimals,
//! accuracy, integrity score and GII to 4). This rounding is part of the wire
//! format; verifiers must apply it too.
//!
//! Hashing detects tampering. It does not sign anything.

#![deny(unsafe_code)]

pub mod canonical;
pub mod error;
pub mod receipt;

pub use canonical::{canonicalize, hash, ReceiptPayload};
pub use error::ReceiptError;
pub use receipt::{create_receipt, ensure_valid, verify, Receipt, ReceiptInput, LEARN_MINT_KIND};
