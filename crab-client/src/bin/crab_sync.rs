//! Headless replica: connect, follow the log, keep price rules current,
//! report ghost orders

use anyhow::Context;
use crab_client::{ClientConfig, HttpTransport, SyncEngine, SyncMode, SyncStorage, logger};
use std::time::Duration;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env();
    logger::init_logger(&config.log);

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;
    let storage = SyncStorage::open(config.database_path()).context("opening replica")?;
    let transport = HttpTransport::new(&config).context("building HTTP client")?;

    let engine = SyncEngine::new(
        transport.clone(),
        storage,
        config.sync.clone(),
        config.pricing,
    );

    if let Err(e) = engine.refresh_rules(&transport).await {
        warn!(error = %e, "Price rules unavailable, using cached set");
    }
    if let Err(e) = engine.connect().await {
        warn!(error = %e, "Initial connect failed");
        engine.reconnect().await.context("reconnect")?;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                engine.disconnect().await;
                return Ok(());
            }
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }

        match engine.refresh_rules(&transport).await {
            Ok(true) => info!("Price rules updated"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Price rule refresh failed, keeping current set"),
        }

        if let Err(e) = engine.sync(SyncMode::Auto).await {
            warn!(error = %e, "Sync failed");
            engine.reconnect().await.context("reconnect")?;
        }
        let ghosts = engine.ghost_orders().await;
        if !ghosts.is_empty() {
            let ids: Vec<_> = ghosts.iter().map(|g| g.order_id.as_str()).collect();
            warn!(count = ghosts.len(), orders = ?ids, "Ghost orders awaiting operator action");
        }
    }
}
