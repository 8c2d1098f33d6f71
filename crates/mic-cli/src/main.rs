//! micctl binary entry point

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    mic_cli::run().context("micctl failed")
}
