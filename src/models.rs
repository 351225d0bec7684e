//! Shared data structures used throughout the application.

use std::time::SystemTime;

/// Direction of the 24-hour price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTrend {
    Up,
    Down,
}

impl PriceTrend {
    /// Derive the trend from a signed percentage change. Zero counts as up.
    pub fn from_change(change: f64) -> Self {
        if change >= 0.0 {
            PriceTrend::Up
        } else {
            PriceTrend::Down
        }
    }
}

/// Latest observed price for the configured trading pair, with its
/// percentage change relative to the 24-hour open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSnapshot {
    /// Latest trade price.
    pub current: f64,
    /// Percentage change versus the 24-hour open price.
    pub change: f64,
    /// Sign of `change`, precomputed for the UI.
    pub trend: PriceTrend,
    /// Time of the last successful price observation; `None` until the
    /// first bootstrap response or trade event lands.
    pub last_update: Option<SystemTime>,
}

impl PriceSnapshot {
    /// USD value of a coin amount at the current price.
    pub fn usd_value(&self, amount: f64) -> f64 {
        amount * self.current
    }
}

impl Default for PriceSnapshot {
    fn default() -> Self {
        Self {
            current: 0.0,
            change: 0.0,
            trend: PriceTrend::Up,
            last_update: None,
        }
    }
}

/// Lifecycle of the streaming subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    /// Caller-initiated close; never schedules a reconnect.
    ClosedClean,
    /// Unclean closure; a reconnect has been scheduled (or skipped because
    /// the owning view went inactive).
    ClosedError,
}

/// Consumer-visible status of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStatus {
    /// True until the bootstrap attempt completes, success or failure.
    pub loading: bool,
    /// True while the stream is down for a reason other than `stop()`.
    pub ws_error: bool,
    /// Consecutive unclean closures in the current failure streak.
    /// Reset to 0 on every successful open.
    pub retry_count: u32,
    pub connection: ConnectionState,
}

impl Default for FeedStatus {
    fn default() -> Self {
        Self {
            loading: true,
            ws_error: false,
            retry_count: 0,
            connection: ConnectionState::Connecting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_matches_change_sign() {
        assert_eq!(PriceTrend::from_change(4.17), PriceTrend::Up);
        assert_eq!(PriceTrend::from_change(0.0), PriceTrend::Up);
        assert_eq!(PriceTrend::from_change(-0.01), PriceTrend::Down);
    }

    #[test]
    fn usd_value_scales_with_balance() {
        let snap = PriceSnapshot {
            current: 0.1248,
            ..PriceSnapshot::default()
        };
        assert!((snap.usd_value(18869.42) - 2354.903616).abs() < 1e-9);
        assert_eq!(PriceSnapshot::default().usd_value(100.0), 0.0);
    }
}
