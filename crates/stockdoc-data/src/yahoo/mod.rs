//! Yahoo Finance data providers.

pub mod quotes;

pub use quotes::{YahooQuoteProvider, adjusted_close_series};
