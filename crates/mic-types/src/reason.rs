use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseEnumError;

/// Why a ledger entry exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MicReason {
    /// Learning module completion
    Learn,
    /// Other earning activity
    Earn,
    /// Streak or achievement bonus
    Bonus,
    /// Manual correction; may be negative
    Correction,
}

impl MicReason {
    pub const ALL: [MicReason; 4] = [
        MicReason::Learn,
        MicReason::Earn,
        MicReason::Bonus,
        MicReason::Correction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MicReason::Learn => "LEARN",
            MicReason::Earn => "EARN",
            MicReason::Bonus => "BONUS",
            MicReason::Correction => "CORRECTION",
        }
    }
}

impl std::fmt::Display for MicReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MicReason {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MicReason::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError {
                kind: "reason",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_upper_case() {
        let json = serde_json::to_string(&MicReason::Correction).unwrap();
        assert_eq!(json, "\"CORRECTION\"");
        let back: MicReason = serde_json::from_str("\"LEARN\"").unwrap();
        assert_eq!(back, MicReason::Learn);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("bonus".parse::<MicReason>().unwrap(), MicReason::Bonus);
        assert!("refund".parse::<MicReason>().is_err());
    }
}
