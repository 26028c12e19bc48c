//! Error kinds surfaced by the price pipeline

use thiserror::Error;

/// Failures the pipeline reports to its caller.
///
/// FX lookups never appear here: the rate cascade always produces a value
/// and signals degradation through [`crate::core::RateSource`] instead.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("No data returned for symbol: {0}")]
    NoData(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Plotting failed: {0}")]
    PlotError(String),
}

impl TrackerError {
    /// Short name of the error kind, used for dialog titles.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerError::InvalidSymbol(_) => "Invalid symbol",
            TrackerError::NoData(_) => "No data",
            TrackerError::ProviderError(_) => "Provider error",
            TrackerError::PlotError(_) => "Plot error",
        }
    }
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
