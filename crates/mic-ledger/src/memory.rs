use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use mic_types::{is_unit_interval, round_to, LedgerEntryId, PrincipalId};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::LedgerError;
use crate::store::LedgerStore;
use crate::types::{AppendRequest, LedgerEntry};

type Trajectory = Arc<RwLock<Vec<LedgerEntry>>>;

/// In-memory authoritative ledger.
///
/// Each principal owns an append-only trajectory guarded by its own lock.
/// The shard map is only touched to find or create a trajectory, so appends
/// for different principals never contend on the same lock.
pub struct InMemoryLedgerStore {
    trajectories: DashMap<PrincipalId, Trajectory>,
    next_sequence: AtomicU64,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            trajectories: DashMap::new(),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Total entries across all principals.
    pub fn len(&self) -> usize {
        self.trajectories
            .iter()
            .map(|shard| shard.value().read().len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Principals with at least one entry, sorted.
    pub fn principals(&self) -> Vec<PrincipalId> {
        let mut out: Vec<PrincipalId> = self
            .trajectories
            .iter()
            .map(|shard| shard.key().clone())
            .collect();
        out.sort();
        out
    }

    fn trajectory(&self, principal: &PrincipalId) -> Option<Trajectory> {
        self.trajectories
            .get(principal)
            .map(|shard| Arc::clone(shard.value()))
    }

    fn trajectory_or_create(&self, principal: &PrincipalId) -> Trajectory {
        if let Some(existing) = self.trajectory(principal) {
            return existing;
        }
        Arc::clone(
            self.trajectories
                .entry(principal.clone())
                .or_default()
                .value(),
        )
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural checks only; business eligibility is not the ledger's concern.
fn validate(request: &AppendRequest) -> Result<(), LedgerError> {
    if !request.amount.is_finite() {
        return Err(LedgerError::invalid(
            "amount",
            format!("must be finite, got {}", request.amount),
        ));
    }
    if !is_unit_interval(request.integrity_score) {
        return Err(LedgerError::invalid(
            "integrity_score",
            format!("must be within [0, 1], got {}", request.integrity_score),
        ));
    }
    if let Some(gii) = request.gii {
        if !is_unit_interval(gii) {
            return Err(LedgerError::invalid(
                "gii",
                format!("must be within [0, 1], got {}", gii),
            ));
        }
    }
    if let Some(metadata) = &request.metadata {
        if !metadata.is_object() {
            return Err(LedgerError::invalid("metadata", "must be a JSON object"));
        }
    }
    Ok(())
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, request: AppendRequest) -> Result<LedgerEntry, LedgerError> {
        validate(&request)?;

        let trajectory = self.trajectory_or_create(&request.principal_id);
        let mut entries = trajectory.write();

        // Sequence is taken under the principal's lock so each trajectory is
        // strictly increasing.
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let entry = LedgerEntry {
            id: LedgerEntryId::generate(),
            sequence,
            principal_id: request.principal_id,
            amount: round_to(request.amount, 2),
            reason: request.reason,
            integrity_score: round_to(request.integrity_score, 4),
            gii: request.gii.map(|g| round_to(g, 4)),
            module_id: request.module_id,
            session_id: request.session_id,
            transaction_id: request.transaction_id,
            metadata: request
                .metadata
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            created_at: Utc::now(),
        };

        debug!(
            principal = %entry.principal_id,
            entry_id = %entry.id,
            sequence = entry.sequence,
            amount = entry.amount,
            reason = %entry.reason,
            "Appending ledger entry"
        );

        entries.push(entry.clone());
        Ok(entry)
    }

    fn scan(&self, principal: &PrincipalId, visit: &mut dyn FnMut(&[LedgerEntry])) {
        match self.trajectory(principal) {
            Some(trajectory) => visit(&trajectory.read()),
            None => visit(&[]),
        }
    }
}
