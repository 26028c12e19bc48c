//! Currency conversion abstractions

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Display;

/// Where the USD→NPR rate in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    Cache,
    Default,
}

impl Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RateSource::Live => "live",
            RateSource::Cache => "cache",
            RateSource::Default => "default",
        })
    }
}

/// A positive, finite conversion rate tagged with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateResult {
    pub value: f64,
    pub source: RateSource,
}

impl RateResult {
    /// Banner text such as `USD→NPR: 132.54 (live)`.
    pub fn banner(&self) -> String {
        format!("USD→NPR: {:.2} ({})", self.value, self.source)
    }
}

/// Outcome of asking a single rate endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum RateAttempt {
    Rate(f64),
    Fail(String),
}

/// A single USD→NPR rate endpoint. One request per call, no retries.
#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn attempt(&self) -> RateAttempt;
}

/// True for values usable as a conversion rate.
pub fn is_usable_rate(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
