use mic_types::{round_to, MicReason, PrincipalId};

use crate::error::LedgerError;
use crate::types::{AppendRequest, BalanceBreakdown, LedgerEntry, LedgerPage, WalletSummary};

/// Append-only ledger storage.
///
/// Implementations provide three primitives: append, an append-ordered scan of
/// one principal's entries, and balance aggregation. Every read operation is
/// derived from a single scan, so each call observes one consistent snapshot
/// of that principal's history.
pub trait LedgerStore: Send + Sync {
    /// Append a new entry. This is the only way to move a balance.
    fn append(&self, request: AppendRequest) -> Result<LedgerEntry, LedgerError>;

    /// Visit the principal's entries in append order (oldest first).
    ///
    /// An unknown principal is visited with an empty slice.
    fn scan(&self, principal: &PrincipalId, visit: &mut dyn FnMut(&[LedgerEntry]));

    /// Derived balance: sum of the principal's amounts, 0 if none.
    fn balance(&self, principal: &PrincipalId) -> f64 {
        let mut total = 0.0;
        self.scan(principal, &mut |entries: &[LedgerEntry]| {
            total = entries.iter().map(|e| e.amount).sum();
        });
        round_to(total, 2)
    }

    /// Most recent entries first, at most `limit`.
    fn recent(&self, principal: &PrincipalId, limit: usize) -> Vec<LedgerEntry> {
        let mut out = Vec::new();
        self.scan(principal, &mut |entries: &[LedgerEntry]| {
            out = entries.iter().rev().take(limit).cloned().collect();
        });
        out
    }

    /// Paginated history, most recent first.
    ///
    /// `offset` counts back from the tail as it stands at call time.
    fn page(&self, principal: &PrincipalId, limit: usize, offset: usize) -> LedgerPage {
        let mut page = LedgerPage::default();
        self.scan(principal, &mut |entries: &[LedgerEntry]| {
            let total = entries.len();
            let end = total.saturating_sub(offset);
            let start = end.saturating_sub(limit);
            page = LedgerPage {
                total,
                entries: entries[start..end].iter().rev().cloned().collect(),
            };
        });
        page
    }

    /// Per-reason subtotals plus the total balance.
    fn breakdown(&self, principal: &PrincipalId) -> BalanceBreakdown {
        let mut breakdown = BalanceBreakdown::default();
        self.scan(principal, &mut |entries: &[LedgerEntry]| {
            breakdown = BalanceBreakdown::from_entries(entries);
        });
        breakdown
    }

    fn last_entry(&self, principal: &PrincipalId) -> Option<LedgerEntry> {
        let mut last = None;
        self.scan(principal, &mut |entries: &[LedgerEntry]| {
            last = entries.last().cloned();
        });
        last
    }

    fn entry_count(&self, principal: &PrincipalId) -> usize {
        let mut count = 0;
        self.scan(principal, &mut |entries: &[LedgerEntry]| count = entries.len());
        count
    }

    /// Entries with the given reason, oldest first.
    fn entries_by_reason(&self, principal: &PrincipalId, reason: MicReason) -> Vec<LedgerEntry> {
        let mut out = Vec::new();
        self.scan(principal, &mut |entries: &[LedgerEntry]| {
            out = entries
                .iter()
                .filter(|e| e.reason == reason)
                .cloned()
                .collect();
        });
        out
    }

    /// Whether the principal already has a `LEARN` entry for this module.
    fn has_completed_module(&self, principal: &PrincipalId, module_id: &str) -> bool {
        let mut found = false;
        self.scan(principal, &mut |entries: &[LedgerEntry]| {
            found = entries
                .iter()
                .any(|e| e.reason == MicReason::Learn && e.module_id.as_deref() == Some(module_id));
        });
        found
    }

    /// Balance, last activity and recent entries from one snapshot.
    fn wallet_summary(&self, principal: &PrincipalId, recent_limit: usize) -> WalletSummary {
        let mut summary = WalletSummary {
            principal_id: principal.clone(),
            balance: 0.0,
            last_updated: None,
            recent: Vec::new(),
        };
        self.scan(principal, &mut |entries: &[LedgerEntry]| {
            summary.balance = round_to(entries.iter().map(|e| e.amount).sum(), 2);
            summary.last_updated = entries.last().map(|e| e.created_at);
            summary.recent = entries.iter().rev().take(recent_limit).cloned().collect();
        });
        summary
    }
}
