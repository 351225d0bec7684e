//! Core library for the tipjar-price-feed project.
//!
//! Maintains a live view of a single trading pair's price and its
//! 24-hour percentage change for display in the tip-jar UI: a one-shot
//! REST bootstrap followed by a streaming trade subscription with
//! bounded-backoff reconnection.

pub mod config;
pub mod errors;
pub mod feed;
pub mod models;
pub mod utils;
