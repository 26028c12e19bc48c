//! Core price tracking logic

pub mod alert;
pub mod analytics;
pub mod config;
pub mod currency;
pub mod error;
pub mod history;
pub mod history_fetcher;
pub mod log;
pub mod pipeline;
pub mod rate_fetcher;
pub mod symbol;

// Re-export main types for cleaner imports
pub use currency::{CurrencyRateProvider, RateAttempt, RateResult, RateSource};
pub use error::{TrackerError, TrackerResult};
pub use history::{ConvertedSeries, HistoryFrame, HistoryProvider, Period};
pub use pipeline::{PipelineOutput, PricePipeline};
pub use symbol::Symbol;
