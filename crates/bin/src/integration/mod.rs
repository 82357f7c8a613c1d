//! Wiring between the command line and the data layer.
//!
//! Resolves the on-disk cache and assembles the cached data source the views
//! read from.

pub(crate) mod cache_manager;
pub(crate) mod data_source;
