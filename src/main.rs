use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tipjar_price_feed::{config::AppConfig, feed::PriceFeedClient, utils};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load();
    tracing::info!(symbol = %config.symbol, "[INIT] tipjar-price-feed starting");

    // No page-visibility signal on the CLI; the demo is always active.
    let mut client = PriceFeedClient::new(config, Arc::new(|| true));
    let snapshot_rx = client.snapshot();
    let status_rx = client.status();
    client.start();

    let heartbeat = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(5));
        loop {
            ticker.tick().await;
            let snap = *snapshot_rx.borrow();
            let status = *status_rx.borrow();
            if status.loading {
                tracing::info!("[HEARTBEAT] waiting for bootstrap");
            } else if status.ws_error {
                tracing::info!(retry_count = status.retry_count, "[HEARTBEAT] reconnecting");
            } else {
                tracing::info!(
                    price = snap.current,
                    change_pct = snap.change,
                    trend = ?snap.trend,
                    "[HEARTBEAT] live"
                );
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("[SHUTDOWN] ctrl-c received; stopping feed");
    heartbeat.abort();
    client.stop().await;
    Ok(())
}
