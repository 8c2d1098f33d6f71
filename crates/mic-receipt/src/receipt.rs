use chrono::{DateTime, SecondsFormat, Utc};
use mic_types::{round_to, PrincipalId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::canonical::{hash, ReceiptPayload};
use crate::error::ReceiptError;

/// Receipt kind for learning-completion mints.
pub const LEARN_MINT_KIND: &str = "LEARN_MINT";

/// Inputs to [`create_receipt`]. Values are rounded by the generator.
#[derive(Clone, Debug)]
pub struct ReceiptInput {
    pub subject_id: PrincipalId,
    pub session_id: String,
    pub module_id: String,
    pub minted_amount: f64,
    pub accuracy: f64,
    pub integrity_score: f64,
    pub gii: f64,
    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
}

/// A hashed record of one mint event.
///
/// Field values are stored exactly as they were hashed, so the receipt can be
/// serialized, shipped and verified elsewhere without re-rounding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub kind: String,
    pub subject_id: String,
    pub learning_session_id: String,
    pub module_id: String,
    pub minted_mic: f64,
    pub accuracy: f64,
    pub integrity_score: f64,
    pub gii: f64,
    /// RFC 3339, UTC, `Z`-suffixed
    pub timestamp: String,
    pub receipt_hash: String,
}

impl Receipt {
    /// The canonical field mapping the hash is computed over.
    pub fn payload(&self) -> ReceiptPayload {
        [
            ("kind", json!(self.kind)),
            ("subject_id", json!(self.subject_id)),
            ("learning_session_id", json!(self.learning_session_id)),
            ("module_id", json!(self.module_id)),
            ("minted_mic", json!(self.minted_mic)),
            ("accuracy", json!(self.accuracy)),
            ("integrity_score", json!(self.integrity_score)),
            ("gii", json!(self.gii)),
            ("ts", Value::String(self.timestamp.clone())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Hash recomputed from the current field values.
    pub fn recompute_hash(&self) -> String {
        hash(&self.payload())
    }

    /// Parsed issue time, if the timestamp is well-formed.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Build a `LEARN_MINT` receipt and compute its hash.
pub fn create_receipt(input: ReceiptInput) -> Receipt {
    let timestamp = input
        .timestamp
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Micros, true);

    let mut receipt = Receipt {
        kind: LEARN_MINT_KIND.to_string(),
        subject_id: input.subject_id.to_string(),
        learning_session_id: input.session_id,
        module_id: input.module_id,
        minted_mic: round_to(input.minted_amount, 2),
        accuracy: round_to(input.accuracy, 4),
        integrity_score: round_to(input.integrity_score, 4),
        gii: round_to(input.gii, 4),
        timestamp,
        receipt_hash: String::new(),
    };
    receipt.receipt_hash = receipt.recompute_hash();

    debug!(
        subject = %receipt.subject_id,
        module = %receipt.module_id,
        minted = receipt.minted_mic,
        hash = %receipt.receipt_hash,
        "Receipt created"
    );
    receipt
}

/// `true` iff the stored hash matches the recomputed one.
pub fn verify(receipt: &Receipt) -> bool {
    receipt.recompute_hash() == receipt.receipt_hash
}

/// Like [`verify`], but a mismatch is an error carrying both hashes.
pub fn ensure_valid(receipt: &Receipt) -> Result<(), ReceiptError> {
    let actual = receipt.recompute_hash();
    if actual == receipt.receipt_hash {
        return Ok(());
    }
    warn!(
        subject = %receipt.subject_id,
        expected = %receipt.receipt_hash,
        actual = %actual,
        "Receipt failed verification"
    );
    Err(ReceiptError::HashMismatch {
        expected: receipt.receipt_hash.clone(),
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input() -> ReceiptInput {
        ReceiptInput {
            subject_id: PrincipalId::new("learner-7"),
            session_id: "session-42".into(),
            module_id: "algebra-1".into(),
            minted_amount: 119.0,
            accuracy: 0.95,
            integrity_score: 0.9,
            gii: 0.95,
            timestamp: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn fresh_receipt_verifies() {
        let receipt = create_receipt(input());
        assert_eq!(receipt.kind, LEARN_MINT_KIND);
        assert_eq!(receipt.receipt_hash.len(), 64);
        assert!(verify(&receipt));
        assert!(ensure_valid(&receipt).is_ok());
    }

    #[test]
    fn same_input_same_hash() {
        assert_eq!(
            create_receipt(input()).receipt_hash,
            create_receipt(input()).receipt_hash
        );
    }

    #[test]
    fn timestamp_is_utc_with_z_suffix() {
        let receipt = create_receipt(input());
        assert_eq!(receipt.timestamp, "2026-03-01T12:00:00.000000Z");
        assert_eq!(receipt.issued_at(), input().timestamp);

        let now = create_receipt(ReceiptInput {
            timestamp: None,
            ..input()
        });
        assert!(now.timestamp.ends_with('Z'));
        assert!(now.issued_at().is_some());
    }

    #[test]
    fn values_are_rounded_before_hashing() {
        let receipt = create_receipt(ReceiptInput {
            minted_amount: 10.005_1,
            accuracy: 0.876_54,
            integrity_score: 0.912_345,
            gii: 0.777_77,
            ..input()
        });
        assert_eq!(receipt.minted_mic, 10.01);
        assert_eq!(receipt.accuracy, 0.8765);
        assert_eq!(receipt.integrity_score, 0.9123);
        assert_eq!(receipt.gii, 0.7778);

        let payload = receipt.payload();
        assert_eq!(payload["minted_mic"], json!(10.01));
        assert_eq!(payload["ts"], json!(receipt.timestamp));
        assert!(verify(&receipt));
    }

    #[test]
    fn payload_uses_wire_field_names() {
        let keys: Vec<String> = create_receipt(input()).payload().into_keys().collect();
        assert_eq!(
            keys,
            vec![
                "accuracy",
                "gii",
                "integrity_score",
                "kind",
                "learning_session_id",
                "minted_mic",
                "module_id",
                "subject_id",
                "ts",
            ]
        );
    }

    #[test]
    fn any_single_field_change_breaks_verification() {
        let original = create_receipt(input());
        let tamperings: Vec<Box<dyn Fn(&mut Receipt)>> = vec![
            Box::new(|r| r.kind = "EARN_MINT".into()),
            Box::new(|r| r.subject_id = "learner-8".into()),
            Box::new(|r| r.learning_session_id = "session-43".into()),
            Box::new(|r| r.module_id = "algebra-2".into()),
            Box::new(|r| r.minted_mic = 120.0),
            Box::new(|r| r.accuracy = 0.96),
            Box::new(|r| r.integrity_score = 0.91),
            Box::new(|r| r.gii = 0.94),
            Box::new(|r| r.timestamp = "2026-03-01T12:00:01.000000Z".into()),
            Box::new(|r| r.receipt_hash = "0".repeat(64)),
        ];

        for tamper in tamperings {
            let mut receipt = original.clone();
            tamper(&mut receipt);
            assert!(!verify(&receipt));
            match ensure_valid(&receipt) {
                Err(ReceiptError::HashMismatch { expected, actual }) => {
                    assert_eq!(expected, receipt.receipt_hash);
                    assert_eq!(actual, receipt.recompute_hash());
                }
                other => panic!("expected hash mismatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn json_round_trip_still_verifies() {
        let receipt = create_receipt(input());
        let text = serde_json::to_string(&receipt).unwrap();
        let back: Receipt = serde_json::from_str(&text).unwrap();
        assert_eq!(back, receipt);
        assert!(verify(&back));
    }
}
