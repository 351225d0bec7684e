//! Snapshot update rules: how bootstrap responses and streamed trades
//! produce the next published `PriceSnapshot`.

use std::time::SystemTime;

use crate::feed::binance::Ticker24h;
use crate::models::{PriceSnapshot, PriceTrend};

/// Owns the current snapshot and the 24h-open reference price.
///
/// The reference price is captured once per bootstrap and never drifts:
/// every streamed trade is compared against the same 24h open, so `change`
/// after a trade at price P is always `(P - open) / open * 100` regardless
/// of how many trades came before.
#[derive(Debug)]
pub struct SnapshotState {
    reference_price: Option<f64>,
    snapshot: PriceSnapshot,
}

impl SnapshotState {
    pub fn new() -> Self {
        Self::resume(PriceSnapshot::default())
    }

    /// Continue from a previously published snapshot, e.g. after a restart
    /// of the feed worker. The reference price is not carried over; the new
    /// bootstrap re-captures it.
    pub fn resume(snapshot: PriceSnapshot) -> Self {
        Self {
            reference_price: None,
            snapshot,
        }
    }

    pub fn snapshot(&self) -> PriceSnapshot {
        self.snapshot
    }

    pub fn reference_price(&self) -> Option<f64> {
        self.reference_price
    }

    /// Apply a 24h ticker summary: capture the open price as the reference
    /// and take last price and change as reported by the summary.
    pub fn apply_bootstrap(&mut self, ticker: &Ticker24h) {
        self.reference_price = Some(ticker.open_price);
        self.snapshot = PriceSnapshot {
            current: ticker.last_price,
            change: ticker.change_percent,
            trend: PriceTrend::from_change(ticker.change_percent),
            last_update: Some(SystemTime::now()),
        };
    }

    /// Apply a streamed trade price. `change` is recomputed against the
    /// bootstrap reference when one is known; otherwise the previous value
    /// is kept (neutral 0 if bootstrap never succeeded).
    pub fn apply_trade(&mut self, price: f64) {
        let change = match self.reference_price {
            Some(reference) => (price - reference) / reference * 100.0,
            None => self.snapshot.change,
        };
        self.snapshot = PriceSnapshot {
            current: price,
            change,
            trend: PriceTrend::from_change(change),
            last_update: Some(SystemTime::now()),
        };
    }
}

impl Default for SnapshotState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(last: f64, open: f64, change: f64) -> Ticker24h {
        Ticker24h {
            last_price: last,
            open_price: open,
            change_percent: change,
        }
    }

    #[test]
    fn bootstrap_publishes_summary_values() {
        let mut state = SnapshotState::new();
        state.apply_bootstrap(&ticker(0.1250, 0.1200, 4.17));

        let snap = state.snapshot();
        assert_eq!(snap.current, 0.1250);
        assert_eq!(snap.change, 4.17);
        assert_eq!(snap.trend, PriceTrend::Up);
        assert!(snap.last_update.is_some());
        assert_eq!(state.reference_price(), Some(0.1200));
    }

    #[test]
    fn trade_recomputes_change_against_reference() {
        let mut state = SnapshotState::new();
        state.apply_bootstrap(&ticker(0.1250, 0.1200, 4.17));

        state.apply_trade(0.1230);
        let snap = state.snapshot();
        assert_eq!(snap.current, 0.1230);
        assert!((snap.change - 2.5).abs() < 1e-9);
        assert_eq!(snap.trend, PriceTrend::Up);
    }

    #[test]
    fn change_depends_only_on_latest_trade() {
        let mut a = SnapshotState::new();
        let mut b = SnapshotState::new();
        a.apply_bootstrap(&ticker(0.1250, 0.1200, 4.17));
        b.apply_bootstrap(&ticker(0.1250, 0.1200, 4.17));

        for p in [0.1000, 0.2000, 0.1500, 0.1100] {
            a.apply_trade(p);
        }
        a.apply_trade(0.1230);
        b.apply_trade(0.1230);

        assert_eq!(a.snapshot().change, b.snapshot().change);
    }

    #[test]
    fn trade_below_reference_trends_down() {
        let mut state = SnapshotState::new();
        state.apply_bootstrap(&ticker(0.1250, 0.1200, 4.17));

        state.apply_trade(0.1188);
        let snap = state.snapshot();
        assert!((snap.change - -1.0).abs() < 1e-9);
        assert_eq!(snap.trend, PriceTrend::Down);
    }

    #[test]
    fn trade_without_reference_keeps_previous_change() {
        let mut state = SnapshotState::new();
        state.apply_trade(0.1230);

        let snap = state.snapshot();
        assert_eq!(snap.current, 0.1230);
        assert_eq!(snap.change, 0.0);
        assert_eq!(snap.trend, PriceTrend::Up);
        assert!(snap.last_update.is_some());
    }

    #[test]
    fn resume_keeps_snapshot_but_not_reference() {
        let mut state = SnapshotState::new();
        state.apply_bootstrap(&ticker(0.1250, 0.1200, 4.17));
        let carried = state.snapshot();

        let resumed = SnapshotState::resume(carried);
        assert_eq!(resumed.snapshot(), carried);
        assert_eq!(resumed.reference_price(), None);
    }
}
