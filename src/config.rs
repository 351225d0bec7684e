//! Configuration loader and application settings.

/// Default Binance public REST endpoint (24h ticker summaries).
pub const DEFAULT_REST_URL: &str = "https://api.binance.com";
/// Default Binance public WebSocket endpoint (raw streams).
pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443/ws";
/// Default trading pair tracked by the tip jar.
pub const DEFAULT_SYMBOL: &str = "DOGEUSDT";

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL for the one-shot 24h ticker bootstrap.
    pub rest_url: String,
    /// Base URL for the trade-event stream.
    pub ws_url: String,
    /// Trading pair symbol, e.g. "DOGEUSDT".
    pub symbol: String,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to the
    /// Binance public endpoints and the DOGEUSDT pair.
    pub fn load() -> Self {
        let rest_url =
            std::env::var("FEED_REST_URL").unwrap_or_else(|_| DEFAULT_REST_URL.into());
        let ws_url = std::env::var("FEED_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.into());
        let symbol = std::env::var("FEED_SYMBOL").unwrap_or_else(|_| DEFAULT_SYMBOL.into());
        Self {
            rest_url,
            ws_url,
            symbol,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rest_url: DEFAULT_REST_URL.into(),
            ws_url: DEFAULT_WS_URL.into(),
            symbol: DEFAULT_SYMBOL.into(),
        }
    }
}
