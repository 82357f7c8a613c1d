//! Data layer for stockdoc.
//!
//! Reads raw statement collections from the remote document store, normalizes
//! them into chronologically ordered [`PeriodSeries`], and fetches price
//! histories, all behind a time-bounded cache.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod fields;
pub mod normalize;
pub mod prices;
pub mod records;
pub mod source;
pub mod store;
pub mod yahoo;

pub use cache::{CacheKey, CachePolicy, CacheStore, CacheTier, MemoryCache, SqliteCache};
pub use error::{DataError, Result};
pub use fields::FinancialField;
pub use normalize::{NormalizerConfig, RecordNormalizer};
pub use prices::{PriceSource, StaticPriceSource};
pub use records::{
    DividendRecord, DividendSeries, Granularity, PeriodRecord, PeriodSeries, PriceSeries,
    TickerFundamentals, ValuationSnapshot,
};
pub use source::CachedDataSource;
pub use store::{FirebaseStore, FundamentalsStore, MemoryStore, StoreConfig};
pub use yahoo::YahooQuoteProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
