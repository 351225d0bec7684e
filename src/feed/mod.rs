//! Price feed client.
//!
//! Responsibilities:
//! • Seed the snapshot once from the 24h ticker summary.
//! • Keep the latest trade price for a trading pair via the stream.
//! • Handle reconnection and backoff; release everything on `stop()`.

pub mod backoff;
pub mod binance;
pub mod state;

use std::sync::Arc;

use futures::{StreamExt, pin_mut};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, FeedError, Result};
use crate::models::{ConnectionState, FeedStatus, PriceSnapshot};
use backoff::ReconnectPolicy;
use state::SnapshotState;

/// Predicate consulted when a scheduled reconnection fires: the reconnect
/// only happens if the owning view is still active/visible. Injected so the
/// client stays testable without a real browser context.
pub type ActivityProbe = Arc<dyn Fn() -> bool + Send + Sync>;

/// Maintains a best-effort live view of one trading pair's price.
///
/// One instance per mounted view. `start()` acquires the subscription and
/// the retry timer; `stop()` (or dropping the client) releases both.
/// Consumers read through the `watch` receivers and always observe whole
/// snapshot values, never partial updates.
pub struct PriceFeedClient {
    config: AppConfig,
    is_active: ActivityProbe,
    snapshot_tx: watch::Sender<PriceSnapshot>,
    status_tx: watch::Sender<FeedStatus>,
    worker: Option<Worker>,
}

struct Worker {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Worker {
    fn teardown(self) {
        let _ = self.shutdown_tx.send(true);
        self.handle.abort();
    }
}

impl PriceFeedClient {
    pub fn new(config: AppConfig, is_active: ActivityProbe) -> Self {
        let (snapshot_tx, _) = watch::channel(PriceSnapshot::default());
        let (status_tx, _) = watch::channel(FeedStatus::default());
        Self {
            config,
            is_active,
            snapshot_tx,
            status_tx,
            worker: None,
        }
    }

    /// Receiver for the published snapshot.
    pub fn snapshot(&self) -> watch::Receiver<PriceSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Receiver for the loading/error/connection status.
    pub fn status(&self) -> watch::Receiver<FeedStatus> {
        self.status_tx.subscribe()
    }

    /// Begin the feed: one bootstrap request, then the trade stream.
    ///
    /// Calling this while a feed is already running tears the old one down
    /// first, so there is never more than one live subscription. The current
    /// snapshot carries over; the reference price is re-captured by the new
    /// bootstrap.
    pub fn start(&mut self) {
        if let Some(worker) = self.worker.take() {
            debug!("[FEED] restart requested; tearing down previous worker");
            worker.teardown();
        }
        self.status_tx.send_replace(FeedStatus::default());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = FeedWorker {
            config: self.config.clone(),
            is_active: Arc::clone(&self.is_active),
            snapshot_tx: self.snapshot_tx.clone(),
            status_tx: self.status_tx.clone(),
            shutdown: shutdown_rx,
            state: SnapshotState::resume(*self.snapshot_tx.borrow()),
            policy: ReconnectPolicy::new(),
        };
        let handle = tokio::spawn(worker.run());
        self.worker = Some(Worker {
            shutdown_tx,
            handle,
        });
    }

    /// Terminate the stream and cancel any pending reconnection.
    ///
    /// Safe to call repeatedly, including when nothing is running. The
    /// closure is marked intentional, so no retry is scheduled and the
    /// error flag is not raised.
    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown_tx.send(true);
            if let Err(e) = worker.handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "[FEED] worker exited abnormally");
                }
            }
        }
    }
}

impl Drop for PriceFeedClient {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.teardown();
        }
    }
}

struct FeedWorker {
    config: AppConfig,
    is_active: ActivityProbe,
    snapshot_tx: watch::Sender<PriceSnapshot>,
    status_tx: watch::Sender<FeedStatus>,
    shutdown: watch::Receiver<bool>,
    state: SnapshotState,
    policy: ReconnectPolicy,
}

impl FeedWorker {
    async fn run(mut self) {
        self.bootstrap().await;

        let mut shutdown = self.shutdown.clone();
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.stream_once(&mut shutdown).await {
                // Clean, caller-initiated close.
                Ok(()) => break,
                Err(e) => {
                    let delay = self.policy.record_failure();
                    warn!(
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "[FEED] stream lost"
                    );
                    self.status_tx.send_modify(|s| {
                        s.ws_error = true;
                        s.retry_count = self.policy.failures();
                        s.connection = ConnectionState::ClosedError;
                    });
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {
                            if !(self.is_active)() {
                                // One scheduled attempt per closure; the
                                // caller restarts on next visibility.
                                debug!("[FEED] owner inactive at retry time; not reconnecting");
                                return;
                            }
                        }
                        _ = shutdown.changed() => break,
                    }
                }
            }
        }
        self.status_tx
            .send_modify(|s| s.connection = ConnectionState::ClosedClean);
        debug!("[FEED] worker stopped");
    }

    /// One-shot snapshot seed. Failures are logged and swallowed: the
    /// stream still runs and `change` keeps its previous value until a
    /// later `start()` re-bootstraps.
    async fn bootstrap(&mut self) {
        info!(symbol = %self.config.symbol, "[BOOTSTRAP] fetching 24h ticker");
        match binance::fetch_ticker_24h(&self.config.rest_url, &self.config.symbol).await {
            Ok(ticker) => {
                self.state.apply_bootstrap(&ticker);
                self.snapshot_tx.send_replace(self.state.snapshot());
                info!(
                    last = ticker.last_price,
                    open = ticker.open_price,
                    change_pct = ticker.change_percent,
                    "[BOOTSTRAP] snapshot seeded"
                );
            }
            Err(e) => {
                let err = FeedError::BootstrapFailed(e.to_string());
                warn!(error = %err, "[BOOTSTRAP] failed; keeping previous snapshot");
            }
        }
        self.status_tx.send_modify(|s| s.loading = false);
    }

    /// Run one subscription until it ends. `Ok(())` means shutdown was
    /// requested; any `Err` is an unclean closure and feeds the backoff.
    async fn stream_once(&mut self, shutdown: &mut watch::Receiver<bool>) -> Result<()> {
        info!(url = %self.config.ws_url, symbol = %self.config.symbol, "[WS] connecting");
        let stream = binance::connect_trade_stream(&self.config.ws_url, &self.config.symbol)
            .await
            .map_err(open_failure)?;

        self.policy.record_open();
        self.status_tx.send_modify(|s| {
            s.ws_error = false;
            s.retry_count = 0;
            s.connection = ConnectionState::Open;
        });
        info!("[WS] connected");

        pin_mut!(stream);
        loop {
            tokio::select! {
                maybe_price = stream.next() => match maybe_price {
                    Some(price) => {
                        self.state.apply_trade(price);
                        self.snapshot_tx.send_replace(self.state.snapshot());
                    }
                    None => return Err(FeedError::StreamClosedUnclean.into()),
                },
                _ = shutdown.changed() => return Ok(()),
            }
        }
    }
}

/// Classify a connect failure for the retry policy. Errors that already
/// carry a feed classification (e.g. the handshake timeout) pass through
/// untouched; transport errors are wrapped once.
fn open_failure(e: AppError) -> AppError {
    match e {
        AppError::Feed(_) => e,
        other => FeedError::StreamOpenFailed(other.to_string()).into(),
    }
}
