use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use minote_config::{MinoteConfig, COOKIE_ENV_VAR};
use minote_remote::{ClientConfig, MinoteClient};
use minote_sync::{SyncEngine, SyncEngineConfig};
use minote_vault::{FsVault, JsonLedgerStore};

pub async fn execute(config: MinoteConfig, force: bool) -> Result<()> {
    if config.remote.cookie.as_deref().map_or(true, |c| c.trim().is_empty()) {
        bail!(
            "No session cookie configured: pass --cookie, set {} or remote.cookie",
            COOKIE_ENV_VAR
        );
    }

    let remote = MinoteClient::with_config(ClientConfig::from(&config.remote))
        .context("Failed to create Mi Notes client")?;
    let vault = FsVault::from_config(&config.vault);
    let ledger = JsonLedgerStore::new(config.ledger_path());
    info!(
        "Mirroring {} into {}",
        remote.base_url(),
        vault.root().display()
    );

    let engine = SyncEngine::with_config(
        Arc::new(remote),
        Arc::new(vault),
        Arc::new(ledger),
        SyncEngineConfig::from(&config),
    );
    let report = engine.sync_with_report(force).await?;

    println!("{}", report);
    for failure in &report.failed {
        println!("  failed: {} ({}): {}", failure.title, failure.id, failure.reason);
    }
    Ok(())
}
