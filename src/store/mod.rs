//! File-backed persistence: the cached FX rate and the CSV snapshot

pub mod rate_cache;
pub mod snapshot;

pub use rate_cache::RateCache;
pub use snapshot::CsvSnapshot;
