use anyhow::{Context, Result};
use chrono::{Local, TimeZone};

use minote_config::MinoteConfig;
use minote_core::LedgerStore;
use minote_vault::JsonLedgerStore;

pub async fn execute(config: MinoteConfig) -> Result<()> {
    let ledger = JsonLedgerStore::new(config.ledger_path());
    let records = ledger
        .get_all()
        .await
        .with_context(|| format!("Failed to read ledger {}", ledger.path().display()))?;

    let last = records
        .iter()
        .map(|r| r.sync_time)
        .max()
        .map(format_watermark)
        .unwrap_or_else(|| "never".to_string());

    println!("Ledger: {}", ledger.path().display());
    println!("Mirror: {}", config.vault.mirror_root().display());
    println!("Notes tracked: {}", records.len());
    println!("Last watermark: {}", last);
    Ok(())
}

fn format_watermark(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(time) => format!("{} ({})", time.format("%Y-%m-%d %H:%M:%S"), ms),
        None => ms.to_string(),
    }
}
