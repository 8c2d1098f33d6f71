use std::collections::BTreeMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Flat field → value mapping that a receipt hash is computed over.
///
/// Backed by a `BTreeMap`, so iteration (and serialization) is always in
/// sorted key order regardless of insertion order.
pub type ReceiptPayload = BTreeMap<String, Value>;

/// Sorted-key, whitespace-free JSON form of a payload.
pub fn canonicalize(payload: &ReceiptPayload) -> String {
    let object: serde_json::Map<String, Value> = payload
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(object).to_string()
}

/// Lower-case hex SHA-256 of the canonical form (64 characters).
pub fn hash(payload: &ReceiptPayload) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonicalize(payload).as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn payload(pairs: &[(&str, Value)]) -> ReceiptPayload {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn canonical_form_is_sorted_and_compact() {
        let p = payload(&[
            ("module_id", json!("algebra-1")),
            ("accuracy", json!(0.95)),
            ("kind", json!("LEARN_MINT")),
            ("minted_mic", json!(119.0)),
        ]);
        assert_eq!(
            canonicalize(&p),
            r#"{"accuracy":0.95,"kind":"LEARN_MINT","minted_mic":119.0,"module_id":"algebra-1"}"#
        );
    }

    #[test]
    fn canonical_form_matches_compact_serde_output() {
        let p = payload(&[
            ("ts", json!("2026-03-01T12:00:00.000000Z")),
            ("gii", json!(0.92)),
            ("subject_id", json!("learner-1")),
        ]);
        assert_eq!(canonicalize(&p), serde_json::to_string(&p).unwrap());
    }

    #[test]
    fn strings_are_json_escaped() {
        let p = payload(&[("subject_id", json!("a\"b"))]);
        assert_eq!(canonicalize(&p), r#"{"subject_id":"a\"b"}"#);
    }

    #[test]
    fn hash_is_sha256_hex() {
        let empty = ReceiptPayload::new();
        assert_eq!(canonicalize(&empty), "{}");
        // sha256("{}")
        assert_eq!(
            hash(&empty),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
        let h = hash(&payload(&[("k", json!(1))]));
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn different_values_hash_differently() {
        let a = payload(&[("gii", json!(0.95))]);
        let b = payload(&[("gii", json!(0.9501))]);
        assert_ne!(hash(&a), hash(&b));
    }

    proptest! {
        #[test]
        fn property_canonical_form_ignores_insertion_order(
            fields in proptest::collection::btree_map("[a-z_]{1,12}", -1_000_000i64..1_000_000, 0..10),
            seed in any::<u64>(),
        ) {
            let pairs: Vec<(String, i64)> = fields.into_iter().collect();
            let mut shuffled = pairs.clone();
            // Deterministic permutation from the seed
            let n = shuffled.len();
            if n > 1 {
                let mut state = seed;
                for i in (1..n).rev() {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    let j = (state >> 33) as usize % (i + 1);
                    shuffled.swap(i, j);
                }
            }

            let forward: ReceiptPayload = pairs.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
            let permuted: ReceiptPayload = shuffled.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
            prop_assert_eq!(canonicalize(&forward), canonicalize(&permuted));
            prop_assert_eq!(hash(&forward), hash(&permuted));
        }
    }
}
