use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mic_ledger::{AppendRequest, BalanceBreakdown, LedgerPage, LedgerStore, WalletSummary};
use mic_receipt::{create_receipt, ensure_valid, Receipt, ReceiptInput};
use mic_reward::{classify, describe, RewardEngine, RewardOutcome, RewardRequest};
use mic_types::{Difficulty, LedgerEntryId, MicReason, PrincipalId, SystemHealth, TransactionId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::MintError;

/// A request to credit MIC for a completed learning session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MintRequest {
    pub principal_id: PrincipalId,
    pub module_id: String,
    pub session_id: String,
    pub mic_amount: f64,
    pub accuracy: f64,
    pub integrity_score: f64,
}

/// Result of a committed mint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MintOutcome {
    pub transaction_id: TransactionId,
    pub ledger_id: LedgerEntryId,
    pub principal_id: PrincipalId,
    pub module_id: String,
    pub session_id: String,
    pub mic_minted: f64,
    /// Derived balance read right after the append
    pub new_balance: f64,
    pub integrity_score_used: f64,
    pub system_status: SystemHealth,
    pub gii: f64,
    pub receipt: Receipt,
    pub minted_at: DateTime<Utc>,
}

/// Completion metrics for [`MintingOrchestrator::complete`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub principal_id: PrincipalId,
    pub module_id: String,
    pub session_id: String,
    pub base_reward: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub accuracy: f64,
    pub integrity_score: f64,
    #[serde(default)]
    pub streak_days: u32,
}

/// Reward decision for a completion, plus the mint if one happened.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub reward: RewardOutcome,
    /// `None` when the completion was ineligible or earned nothing
    pub mint: Option<MintOutcome>,
}

impl CompletionOutcome {
    pub fn minted(&self) -> bool {
        self.mint.is_some()
    }
}

/// Mint coordinator over a ledger store and a reward engine.
///
/// Holds no balance state of its own; every balance it reports is read back
/// from the ledger.
///
/// Mints and completions for one principal run one at a time, so a
/// completion's first-completion check and its append see the same history.
pub struct MintingOrchestrator {
    ledger: Arc<dyn LedgerStore>,
    engine: RewardEngine,
    principal_locks: DashMap<PrincipalId, Arc<Mutex<()>>>,
}

impl MintingOrchestrator {
    pub fn new(ledger: Arc<dyn LedgerStore>, engine: RewardEngine) -> Self {
        Self {
            ledger,
            engine,
            principal_locks: DashMap::new(),
        }
    }

    fn principal_lock(&self, principal: &PrincipalId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.principal_locks.get(principal) {
            return Arc::clone(lock.value());
        }
        Arc::clone(
            self.principal_locks
                .entry(principal.clone())
                .or_default()
                .value(),
        )
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerStore> {
        &self.ledger
    }

    pub fn engine(&self) -> &RewardEngine {
        &self.engine
    }

    /// Credit `mic_amount` to the principal as a `LEARN` entry.
    ///
    /// The gates are evaluated against the GII read now, not the one any
    /// earlier estimate saw. The receipt is built and verified before the
    /// append, so a failure at any step leaves the ledger untouched.
    pub fn mint(&self, request: MintRequest) -> Result<MintOutcome, MintError> {
        let lock = self.principal_lock(&request.principal_id);
        let _guard = lock.lock();
        self.mint_locked(request)
    }

    /// Body of [`Self::mint`]; the caller holds the principal's lock.
    fn mint_locked(&self, request: MintRequest) -> Result<MintOutcome, MintError> {
        if !request.mic_amount.is_finite() || request.mic_amount < 0.0 {
            return Err(MintError::InvalidAmount {
                amount: request.mic_amount,
            });
        }

        let gii = self.engine.current_gii();
        let health = classify(gii);
        let failures = self
            .engine
            .gate(gii, request.integrity_score, request.accuracy);
        if !failures.is_empty() {
            warn!(
                principal = %request.principal_id,
                module = %request.module_id,
                gii,
                reason = %describe(&failures),
                "Mint rejected at commit"
            );
            return Err(MintError::Ineligible { failures });
        }

        let transaction_id = TransactionId::generate();
        let minted_at = Utc::now();

        let receipt = create_receipt(ReceiptInput {
            subject_id: request.principal_id.clone(),
            session_id: request.session_id.clone(),
            module_id: request.module_id.clone(),
            minted_amount: request.mic_amount,
            accuracy: request.accuracy,
            integrity_score: request.integrity_score,
            gii,
            timestamp: Some(minted_at),
        });
        ensure_valid(&receipt)?;

        let metadata = json!({
            "accuracy": request.accuracy,
            "gii_multiplier": health.multiplier,
            "system_status": health.status.as_str(),
            "receipt_hash": receipt.receipt_hash,
            "receipt_kind": receipt.kind,
            "receipt_ts": receipt.timestamp,
        });

        let entry = self.ledger.append(
            AppendRequest::new(
                request.principal_id.clone(),
                request.mic_amount,
                MicReason::Learn,
                request.integrity_score,
            )
            .with_gii(gii)
            .with_module(request.module_id.clone())
            .with_session(request.session_id.clone())
            .with_transaction(transaction_id.clone())
            .with_metadata(metadata),
        )?;

        let new_balance = self.ledger.balance(&request.principal_id);

        info!(
            principal = %request.principal_id,
            amount = entry.amount,
            module = %request.module_id,
            tx = %transaction_id,
            new_balance,
            "MIC minted"
        );

        Ok(MintOutcome {
            transaction_id,
            ledger_id: entry.id,
            principal_id: request.principal_id,
            module_id: request.module_id,
            session_id: request.session_id,
            mic_minted: entry.amount,
            new_balance,
            integrity_score_used: request.integrity_score,
            system_status: health.status,
            gii,
            receipt,
            minted_at,
        })
    }

    /// Compute the reward for a completion and mint it when eligible.
    ///
    /// First completion is derived from the principal's `LEARN` history, and
    /// a perfect score means accuracy of 1.0. An ineligible or zero reward is
    /// returned without touching the ledger, so it does not count as a
    /// completion for later first-completion checks.
    pub fn complete(&self, request: CompletionRequest) -> Result<CompletionOutcome, MintError> {
        let lock = self.principal_lock(&request.principal_id);
        let _guard = lock.lock();

        let is_first_completion = !self
            .ledger
            .has_completed_module(&request.principal_id, &request.module_id);

        let reward = self.engine.calculate_reward(&RewardRequest {
            base_reward: request.base_reward,
            accuracy: request.accuracy,
            integrity_score: request.integrity_score,
            difficulty: request.difficulty,
            streak_days: request.streak_days,
            is_perfect_score: request.accuracy >= 1.0,
            is_first_completion,
        });

        if !reward.can_mint || reward.mic_earned == 0 {
            debug!(
                principal = %request.principal_id,
                module = %request.module_id,
                can_mint = reward.can_mint,
                "Completion recorded without mint"
            );
            return Ok(CompletionOutcome { reward, mint: None });
        }

        let mint = self.mint_locked(MintRequest {
            principal_id: request.principal_id,
            module_id: request.module_id,
            session_id: request.session_id,
            mic_amount: reward.mic_earned as f64,
            accuracy: request.accuracy,
            integrity_score: request.integrity_score,
        })?;

        Ok(CompletionOutcome {
            reward,
            mint: Some(mint),
        })
    }

    pub fn balance(&self, principal: &PrincipalId) -> f64 {
        self.ledger.balance(principal)
    }

    pub fn breakdown(&self, principal: &PrincipalId) -> BalanceBreakdown {
        self.ledger.breakdown(principal)
    }

    pub fn page(&self, principal: &PrincipalId, limit: usize, offset: usize) -> LedgerPage {
        self.ledger.page(principal, limit, offset)
    }

    pub fn wallet_summary(&self, principal: &PrincipalId, recent_limit: usize) -> WalletSummary {
        self.ledger.wallet_summary(principal, recent_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mic_ledger::InMemoryLedgerStore;
    use mic_receipt::verify;
    use mic_reward::{Gate, SharedHealthProvider, StaticHealthProvider};

    fn orchestrator(gii: f64) -> (MintingOrchestrator, Arc<InMemoryLedgerStore>) {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let engine = RewardEngine::new(Arc::new(StaticHealthProvider::new(gii)));
        (MintingOrchestrator::new(ledger.clone(), engine), ledger)
    }

    fn request(amount: f64) -> MintRequest {
        MintRequest {
            principal_id: PrincipalId::new("learner-1"),
            module_id: "algebra-1".into(),
            session_id: "session-1".into(),
            mic_amount: amount,
            accuracy: 0.95,
            integrity_score: 0.9,
        }
    }

    #[test]
    fn mint_appends_one_learn_entry_and_reports_balance() {
        let (orch, ledger) = orchestrator(0.95);
        let outcome = orch.mint(request(119.0)).unwrap();

        assert_eq!(outcome.mic_minted, 119.0);
        assert_eq!(outcome.new_balance, 119.0);
        assert_eq!(outcome.system_status, SystemHealth::Healthy);
        assert_eq!(outcome.gii, 0.95);
        assert!(outcome.transaction_id.as_str().starts_with("tx_mic_"));

        let entries = ledger.recent(&outcome.principal_id, 10);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.id, outcome.ledger_id);
        assert_eq!(entry.reason, MicReason::Learn);
        assert_eq!(entry.transaction_id.as_ref(), Some(&outcome.transaction_id));
        assert_eq!(entry.module_id.as_deref(), Some("algebra-1"));
        assert_eq!(entry.session_id.as_deref(), Some("session-1"));
        assert_eq!(entry.gii, Some(0.95));
    }

    #[test]
    fn entry_metadata_links_the_receipt() {
        let (orch, ledger) = orchestrator(0.8);
        let outcome = orch.mint(request(40.0)).unwrap();
        let entry = ledger.last_entry(&outcome.principal_id).unwrap();

        assert_eq!(entry.metadata["receipt_hash"], outcome.receipt.receipt_hash);
        assert_eq!(entry.metadata["receipt_kind"], "LEARN_MINT");
        assert_eq!(entry.metadata["receipt_ts"], outcome.receipt.timestamp);
        assert_eq!(entry.metadata["system_status"], "warning");
        assert_eq!(entry.metadata["gii_multiplier"], 0.8);
        assert_eq!(entry.metadata["accuracy"], 0.95);
        assert!(verify(&outcome.receipt));
        assert_eq!(outcome.receipt.minted_mic, 40.0);
        assert_eq!(outcome.receipt.subject_id, "learner-1");
    }

    #[test]
    fn ineligible_mint_lists_failures_and_writes_nothing() {
        let (orch, ledger) = orchestrator(0.55);
        let mut req = request(50.0);
        req.integrity_score = 0.65;

        let err = orch.mint(req).unwrap_err();
        let gates: Vec<Gate> = err.failures().iter().map(|f| f.gate).collect();
        assert_eq!(gates, vec![Gate::SystemIntegrity, Gate::UserIntegrity]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn negative_or_non_finite_amounts_are_rejected() {
        let (orch, ledger) = orchestrator(0.95);
        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                orch.mint(request(amount)),
                Err(MintError::InvalidAmount { .. })
            ));
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn commit_uses_current_gii() {
        let health = Arc::new(SharedHealthProvider::new(0.95));
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let orch = MintingOrchestrator::new(ledger.clone(), RewardEngine::new(health.clone()));

        assert!(orch.mint(request(10.0)).is_ok());
        health.set(0.5);
        assert!(matches!(
            orch.mint(request(10.0)),
            Err(MintError::Ineligible { .. })
        ));
        assert_eq!(orch.balance(&PrincipalId::new("learner-1")), 10.0);
    }

    #[test]
    fn complete_awards_first_completion_bonus_once() {
        let (orch, _) = orchestrator(0.95);
        let completion = CompletionRequest {
            principal_id: PrincipalId::new("learner-1"),
            module_id: "algebra-1".into(),
            session_id: "session-1".into(),
            base_reward: 100,
            difficulty: Difficulty::Beginner,
            accuracy: 0.95,
            integrity_score: 0.9,
            streak_days: 0,
        };

        let first = orch.complete(completion.clone()).unwrap();
        // floor(100 * 0.95 * 0.9 * 1.0 * 1.0) + 20
        assert_eq!(first.reward.mic_earned, 105);
        assert_eq!(first.mint.as_ref().map(|m| m.mic_minted), Some(105.0));

        let second = orch.complete(CompletionRequest {
            session_id: "session-2".into(),
            ..completion
        })
        .unwrap();
        assert_eq!(second.reward.mic_earned, 85);
        assert_eq!(
            second.mint.as_ref().map(|m| m.new_balance),
            Some(190.0)
        );
    }

    #[test]
    fn complete_with_perfect_accuracy_applies_perfect_bonus() {
        let (orch, _) = orchestrator(0.95);
        let outcome = orch
            .complete(CompletionRequest {
                principal_id: PrincipalId::new("learner-2"),
                module_id: "geometry-1".into(),
                session_id: "s".into(),
                base_reward: 100,
                difficulty: Difficulty::Beginner,
                accuracy: 1.0,
                integrity_score: 1.0,
                streak_days: 0,
            })
            .unwrap();
        let breakdown = outcome.reward.breakdown.unwrap();
        assert_eq!(breakdown.perfect_bonus_fraction, 0.10);
        // floor(100 * 1.1) + 20
        assert_eq!(outcome.reward.mic_earned, 130);
    }

    #[test]
    fn ineligible_completion_is_reported_without_mint() {
        let (orch, ledger) = orchestrator(0.95);
        let outcome = orch
            .complete(CompletionRequest {
                principal_id: PrincipalId::new("learner-3"),
                module_id: "algebra-1".into(),
                session_id: "s".into(),
                base_reward: 100,
                difficulty: Difficulty::Advanced,
                accuracy: 0.5,
                integrity_score: 0.9,
                streak_days: 7,
            })
            .unwrap();
        assert!(!outcome.minted());
        assert!(!outcome.reward.can_mint);
        assert!(outcome.reward.rejection_reason().is_some());
        assert!(ledger.is_empty());
    }

    #[test]
    fn zero_reward_writes_no_entry() {
        let (orch, ledger) = orchestrator(0.95);
        let principal = PrincipalId::new("learner-4");
        orch.mint(MintRequest {
            principal_id: principal.clone(),
            module_id: "algebra-1".into(),
            session_id: "s0".into(),
            mic_amount: 1.0,
            accuracy: 0.9,
            integrity_score: 0.9,
        })
        .unwrap();

        let outcome = orch
            .complete(CompletionRequest {
                principal_id: principal.clone(),
                module_id: "algebra-1".into(),
                session_id: "s1".into(),
                base_reward: 0,
                difficulty: Difficulty::Beginner,
                accuracy: 0.9,
                integrity_score: 0.9,
                streak_days: 0,
            })
            .unwrap();
        assert!(outcome.reward.can_mint);
        assert_eq!(outcome.reward.mic_earned, 0);
        assert!(!outcome.minted());
        assert_eq!(ledger.entry_count(&principal), 1);
    }

    #[test]
    fn first_completion_with_zero_base_still_records_the_module() {
        let (orch, ledger) = orchestrator(0.95);
        let principal = PrincipalId::new("learner-5");
        let completion = CompletionRequest {
            principal_id: principal.clone(),
            module_id: "algebra-1".into(),
            session_id: "s1".into(),
            base_reward: 0,
            difficulty: Difficulty::Beginner,
            accuracy: 0.9,
            integrity_score: 0.9,
            streak_days: 0,
        };

        let first = orch.complete(completion.clone()).unwrap();
        assert_eq!(first.reward.mic_earned, 20);
        assert!(first.minted());
        assert!(ledger.has_completed_module(&principal, "algebra-1"));

        let repeat = orch
            .complete(CompletionRequest {
                session_id: "s2".into(),
                ..completion
            })
            .unwrap();
        assert_eq!(repeat.reward.mic_earned, 0);
        assert!(!repeat.minted());
        assert_eq!(ledger.entry_count(&principal), 1);
    }

    #[test]
    fn accessors_read_through_to_the_ledger() {
        let (orch, ledger) = orchestrator(0.95);
        let principal = PrincipalId::new("learner-1");
        orch.mint(request(30.0)).unwrap();
        ledger
            .append(AppendRequest::new(principal.clone(), -5.0, MicReason::Correction, 0.9))
            .unwrap();

        assert_eq!(orch.balance(&principal), 25.0);
        let breakdown = orch.breakdown(&principal);
        assert_eq!(breakdown.subtotal(MicReason::Learn), 30.0);
        assert_eq!(breakdown.subtotal(MicReason::Correction), -5.0);
        assert_eq!(breakdown.total, 25.0);

        let page = orch.page(&principal, 1, 0);
        assert_eq!(page.total, 2);
        assert_eq!(page.entries[0].reason, MicReason::Correction);

        let summary = orch.wallet_summary(&principal, 5);
        assert_eq!(summary.balance, 25.0);
        assert_eq!(summary.recent.len(), 2);
    }
}
