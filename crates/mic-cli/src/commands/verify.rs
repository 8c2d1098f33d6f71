//! Receipt verification

use crate::error::CliResult;
use crate::output::{print_json, print_success, OutputFormat};
use clap::Args;
use mic_receipt::{ensure_valid, Receipt};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Receipt JSON file
    pub path: PathBuf,
}

/// Load a receipt and check its hash. A mismatch is an error.
pub fn verify_file(path: &Path) -> CliResult<Receipt> {
    let contents = std::fs::read_to_string(path)?;
    let receipt: Receipt = serde_json::from_str(&contents)?;
    ensure_valid(&receipt)?;
    Ok(receipt)
}

pub fn execute(args: VerifyArgs, format: OutputFormat) -> CliResult<()> {
    let receipt = verify_file(&args.path)?;
    match format {
        OutputFormat::Json => print_json(&receipt)?,
        OutputFormat::Text => {
            print_success(&format!("Receipt valid: {}", receipt.receipt_hash));
            println!(
                "  {} {} MIC to {} for {} at {}",
                receipt.kind,
                receipt.minted_mic,
                receipt.subject_id,
                receipt.module_id,
                receipt.timestamp
            );
        }
    }
    Ok(())
}
