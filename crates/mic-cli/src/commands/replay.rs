//! Replay a mint script against a fresh in-memory ledger
//!
//! A script is JSON Lines, one operation per line, tagged by `op`:
//!
//! ```text
//! {"op":"mint","principal_id":"ada","module_id":"m1","session_id":"s1","mic_amount":50,"accuracy":0.9,"integrity_score":0.9}
//! {"op":"complete","principal_id":"ada","module_id":"m2","session_id":"s2","base_reward":100,"accuracy":1.0,"integrity_score":0.95}
//! {"op":"adjust","principal_id":"ada","amount":-5,"reason":"CORRECTION","integrity_score":0.9}
//! {"op":"set_gii","gii":0.55}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. The GII starts at
//! the configured value and only changes through `set_gii`; the
//! `MIC_GII_OVERRIDE` variable is not consulted.

use crate::config::MicConfig;
use crate::error::{CliError, CliResult};
use crate::output::{print_json, print_success, print_table, print_warning, OutputFormat};
use clap::Args;
use mic_ledger::{
    AppendRequest, BalanceBreakdown, InMemoryLedgerStore, LedgerEntry, LedgerStore,
};
use mic_minting::{CompletionRequest, MintRequest, MintingOrchestrator};
use mic_reward::{RewardEngine, SharedHealthProvider};
use mic_types::{is_unit_interval, MicReason, PrincipalId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tabled::Tabled;
use tracing::debug;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Script file (JSON Lines)
    pub script: PathBuf,

    /// Include each principal's most recent entries
    #[arg(long)]
    pub history: bool,
}

/// One scripted operation.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayOp {
    Mint(MintRequest),
    Complete(CompletionRequest),
    /// Direct ledger entry for non-learning reasons
    Adjust {
        principal_id: PrincipalId,
        amount: f64,
        reason: MicReason,
        integrity_score: f64,
        #[serde(default)]
        note: Option<String>,
    },
    SetGii { gii: f64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayRejection {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletReport {
    pub principal_id: PrincipalId,
    pub balance: f64,
    pub entries: usize,
    pub breakdown: BalanceBreakdown,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: Vec<ReplayRejection>,
    pub wallets: Vec<WalletReport>,
}

#[derive(Tabled)]
struct EntryRow {
    seq: u64,
    reason: String,
    amount: String,
    module: String,
    transaction: String,
}

impl From<&LedgerEntry> for EntryRow {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            seq: entry.sequence,
            reason: entry.reason.to_string(),
            amount: format!("{:.2}", entry.amount),
            module: entry.module_id.clone().unwrap_or_else(|| "-".into()),
            transaction: entry
                .transaction_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".into()),
        }
    }
}

/// Apply every operation in `script` and report the resulting wallets.
///
/// Operations the ledger or the gates refuse are collected as rejections;
/// a line that does not parse aborts the replay.
pub fn replay(script: &str, config: &MicConfig, include_history: bool) -> CliResult<ReplayReport> {
    let ledger = Arc::new(InMemoryLedgerStore::new());
    let health = Arc::new(SharedHealthProvider::new(config.health.gii));
    let engine = RewardEngine::with_policy(config.policy.clone(), health.clone())?;
    let orchestrator = MintingOrchestrator::new(ledger.clone(), engine);

    let mut applied = 0;
    let mut rejected = Vec::new();

    for (index, raw) in script.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let op: ReplayOp = serde_json::from_str(text)
            .map_err(|e| CliError::InvalidInput(format!("line {line}: {e}")))?;

        let result: Result<(), String> = match op {
            ReplayOp::Mint(request) => orchestrator
                .mint(request)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            ReplayOp::Complete(request) => match orchestrator.complete(request) {
                Ok(outcome) => match outcome.reward.rejection_reason() {
                    Some(reason) => Err(reason),
                    None => Ok(()),
                },
                Err(e) => Err(e.to_string()),
            },
            ReplayOp::Adjust {
                principal_id,
                amount,
                reason,
                integrity_score,
                note,
            } => {
                if reason == MicReason::Learn {
                    Err("LEARN entries are only written by mint".to_string())
                } else {
                    let mut request =
                        AppendRequest::new(principal_id, amount, reason, integrity_score);
                    if let Some(note) = note {
                        request = request.with_metadata(serde_json::json!({ "note": note }));
                    }
                    ledger.append(request).map(|_| ()).map_err(|e| e.to_string())
                }
            }
            ReplayOp::SetGii { gii } => {
                if !is_unit_interval(gii) {
                    return Err(CliError::InvalidInput(format!(
                        "line {line}: GII must be within [0, 1], got {gii}"
                    )));
                }
                health.set(gii);
                Ok(())
            }
        };

        match result {
            Ok(()) => applied += 1,
            Err(reason) => {
                debug!(line, %reason, "Replay operation rejected");
                rejected.push(ReplayRejection { line, reason });
            }
        }
    }

    let wallets = ledger
        .principals()
        .into_iter()
        .map(|principal| {
            let history = if include_history {
                orchestrator
                    .page(&principal, config.ledger.page_limit, 0)
                    .entries
            } else {
                Vec::new()
            };
            WalletReport {
                balance: orchestrator.balance(&principal),
                entries: ledger.entry_count(&principal),
                breakdown: orchestrator.breakdown(&principal),
                history,
                principal_id: principal,
            }
        })
        .collect();

    Ok(ReplayReport {
        applied,
        rejected,
        wallets,
    })
}

pub fn execute(args: ReplayArgs, config: &MicConfig, format: OutputFormat) -> CliResult<()> {
    let script = std::fs::read_to_string(&args.script)?;
    let report = replay(&script, config, args.history)?;

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    print_success(&format!(
        "Applied {} operation(s), {} rejected",
        report.applied,
        report.rejected.len()
    ));
    for rejection in &report.rejected {
        print_warning(&format!("line {}: {}", rejection.line, rejection.reason));
    }
    for wallet in &report.wallets {
        println!();
        println!(
            "{}: {:.2} MIC over {} entries",
            wallet.principal_id, wallet.balance, wallet.entries
        );
        for (reason, subtotal) in &wallet.breakdown.by_reason {
            println!("  {:<10} {:>10.2}", reason, subtotal);
        }
        if args.history {
            print_table(wallet.history.iter().map(EntryRow::from).collect());
        }
    }
    Ok(())
}
