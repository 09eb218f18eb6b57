use anyhow::{Context, Result};
use tracing::info;

use minote_config::MinoteConfig;
use minote_core::LedgerStore;
use minote_vault::JsonLedgerStore;

/// Clear the ledger; mirrored files are left in place.
pub async fn execute(config: MinoteConfig) -> Result<()> {
    let ledger = JsonLedgerStore::new(config.ledger_path());
    ledger
        .clear()
        .await
        .with_context(|| format!("Failed to clear ledger {}", ledger.path().display()))?;

    info!("Ledger {} cleared", ledger.path().display());
    println!("Ledger cleared; the next sync rewrites every note");
    Ok(())
}
