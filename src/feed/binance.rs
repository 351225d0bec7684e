//! Binance public-API access.
//!
//! Responsibilities:
//! • One-shot 24h ticker summary used to bootstrap the snapshot.
//! • Streaming trade events for the configured pair.
//!
//! All wire values are string-encoded decimals; parsing and validation
//! happen here so the rest of the feed only sees checked floats.

use crate::errors::{FeedError, Result};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tracing::warn;
use url::Url;

/// Bound on both the bootstrap request and the stream handshake, so a hung
/// endpoint cannot stall the worker past `stop()`.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// 24h ticker summary, already parsed and validated.
#[derive(Debug, Clone, Copy)]
pub struct Ticker24h {
    pub last_price: f64,
    pub open_price: f64,
    pub change_percent: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24hMsg {
    last_price: String,
    open_price: String,
    price_change_percent: String,
}

impl TryFrom<Ticker24hMsg> for Ticker24h {
    type Error = crate::errors::AppError;

    fn try_from(msg: Ticker24hMsg) -> Result<Self> {
        let last_price: f64 = msg.last_price.parse()?;
        let open_price: f64 = msg.open_price.parse()?;
        let change_percent: f64 = msg.price_change_percent.parse()?;
        if !(last_price.is_finite() && last_price > 0.0)
            || !(open_price.is_finite() && open_price > 0.0)
            || !change_percent.is_finite()
        {
            return Err(FeedError::BootstrapFailed(format!(
                "out-of-range ticker values: last={} open={} change={}",
                msg.last_price, msg.open_price, msg.price_change_percent
            ))
            .into());
        }
        Ok(Ticker24h {
            last_price,
            open_price,
            change_percent,
        })
    }
}

/// Fetch the 24h ticker summary for `symbol`, e.g. "DOGEUSDT".
pub async fn fetch_ticker_24h(rest_url: &str, symbol: &str) -> Result<Ticker24h> {
    let url = format!(
        "{}/api/v3/ticker/24hr?symbol={}",
        rest_url,
        symbol.to_uppercase()
    );
    let msg: Ticker24hMsg = reqwest::Client::builder()
        .timeout(CONNECT_TIMEOUT)
        .build()?
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    msg.try_into()
}

#[derive(Debug, Deserialize)]
struct TradeMsg {
    #[serde(rename = "p")]
    price: String,
}

/// Returns an asynchronous stream of trade prices for the given symbol,
/// e.g. "dogeusdt". Malformed or out-of-range messages are logged and
/// dropped; the stream ends when the connection closes for any reason.
pub async fn connect_trade_stream(
    ws_url: &str,
    symbol: &str,
) -> Result<impl Stream<Item = f64>> {
    let stream_path = format!("{}@trade", symbol.to_lowercase());
    let url = Url::parse(&format!("{}/{}", ws_url, stream_path))?;

    let (ws_stream, _resp) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(url.as_str()))
        .await
        .map_err(|_| FeedError::StreamOpenFailed(format!("connect to {url} timed out")))??;

    let mapped = ws_stream.filter_map(|msg_res| async {
        match msg_res {
            Ok(msg) if msg.is_text() => {
                let txt = match msg.into_text() {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(error = %e, "[WS] text extraction failed");
                        return None;
                    }
                };
                let parsed: TradeMsg = match serde_json::from_str(&txt) {
                    Ok(p) => p,
                    Err(e) => {
                        let err = FeedError::StreamMessageMalformed(e.to_string());
                        warn!(error = %err, "[WS] dropping trade message");
                        return None;
                    }
                };
                let price: f64 = match parsed.price.parse() {
                    Ok(p) => p,
                    Err(e) => {
                        let err = FeedError::StreamMessageMalformed(format!(
                            "trade price {:?}: {e}",
                            parsed.price
                        ));
                        warn!(error = %err, "[WS] dropping trade message");
                        return None;
                    }
                };
                if !price.is_finite() || price <= 0.0 {
                    warn!(price, "[WS] dropping out-of-range trade price");
                    return None;
                }
                Some(price)
            }
            Err(e) => {
                warn!(error = %e, "[WS] websocket message error");
                None
            }
            _ => None,
        }
    });
    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ticker_summary() {
        let raw = r#"{
            "symbol": "DOGEUSDT",
            "lastPrice": "0.1250",
            "openPrice": "0.1200",
            "priceChangePercent": "4.17",
            "volume": "123456.0"
        }"#;
        let msg: Ticker24hMsg = serde_json::from_str(raw).expect("json should parse");
        let ticker = Ticker24h::try_from(msg).expect("values should validate");
        assert_eq!(ticker.last_price, 0.1250);
        assert_eq!(ticker.open_price, 0.1200);
        assert_eq!(ticker.change_percent, 4.17);
    }

    #[test]
    fn reject_non_positive_ticker_prices() {
        let raw = r#"{"lastPrice":"0","openPrice":"0.1200","priceChangePercent":"4.17"}"#;
        let msg: Ticker24hMsg = serde_json::from_str(raw).unwrap();
        assert!(Ticker24h::try_from(msg).is_err());

        let raw = r#"{"lastPrice":"0.1250","openPrice":"abc","priceChangePercent":"4.17"}"#;
        let msg: Ticker24hMsg = serde_json::from_str(raw).unwrap();
        assert!(Ticker24h::try_from(msg).is_err());
    }

    #[test]
    fn parse_trade_message_shape() {
        let raw = r#"{"e":"trade","E":1700000000000,"s":"DOGEUSDT","t":1,"p":"0.1230","q":"100.0","m":false}"#;
        let parsed: TradeMsg = serde_json::from_str(raw).expect("json should parse");
        assert_eq!(parsed.price.parse::<f64>().unwrap(), 0.1230);
    }

    #[test]
    fn malformed_trade_messages_are_rejected() {
        assert!(serde_json::from_str::<TradeMsg>("not json").is_err());
        assert!(serde_json::from_str::<TradeMsg>(r#"{"e":"trade"}"#).is_err());
        let parsed: TradeMsg = serde_json::from_str(r#"{"p":"bogus"}"#).unwrap();
        assert!(parsed.price.parse::<f64>().is_err());
    }
}
