use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Parse float error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Failure modes of the price feed itself. None of these are fatal to the
/// process: bootstrap and per-message failures are swallowed after logging,
/// stream failures feed the reconnection policy.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("bootstrap request failed: {0}")]
    BootstrapFailed(String),

    #[error("stream open failed: {0}")]
    StreamOpenFailed(String),

    #[error("stream closed unexpectedly")]
    StreamClosedUnclean,

    #[error("malformed stream message: {0}")]
    StreamMessageMalformed(String),
}
