//! Historical price data and the market-data provider abstraction

use crate::core::error::{TrackerError, TrackerResult};
use crate::core::symbol::Symbol;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Time window of a history request, using the provider's range codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    OneDay,
    FiveDays,
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl Period {
    pub const ALL: [Period; 9] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::Max,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.code() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Invalid period: {}", s))
    }
}

impl TryFrom<String> for Period {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.code().to_string()
    }
}

/// One daily OHLCV row as reported by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Date-indexed OHLCV history stored as parallel columns.
///
/// Always holds at least one row and dates never decrease.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryFrame {
    dates: Vec<NaiveDate>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<u64>,
}

impl HistoryFrame {
    /// Builds a frame from provider rows, ordered by date. Returns `None` for
    /// an empty input.
    pub fn from_bars(mut bars: Vec<Bar>) -> Option<Self> {
        if bars.is_empty() {
            return None;
        }
        bars.sort_by_key(|bar| bar.date);

        let mut frame = HistoryFrame {
            dates: Vec::with_capacity(bars.len()),
            open: Vec::with_capacity(bars.len()),
            high: Vec::with_capacity(bars.len()),
            low: Vec::with_capacity(bars.len()),
            close: Vec::with_capacity(bars.len()),
            volume: Vec::with_capacity(bars.len()),
        };
        for bar in bars {
            frame.dates.push(bar.date);
            frame.open.push(bar.open);
            frame.high.push(bar.high);
            frame.low.push(bar.low);
            frame.close.push(bar.close);
            frame.volume.push(bar.volume);
        }
        Some(frame)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Never true for a frame built through [`HistoryFrame::from_bars`].
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn volume(&self) -> &[u64] {
        &self.volume
    }

    pub fn last_close(&self) -> f64 {
        self.close[self.close.len() - 1]
    }

    pub fn bars(&self) -> impl Iterator<Item = Bar> + '_ {
        (0..self.len()).map(|i| Bar {
            date: self.dates[i],
            open: self.open[i],
            high: self.high[i],
            low: self.low[i],
            close: self.close[i],
            volume: self.volume[i],
        })
    }
}

/// NPR prices aligned with the dates of the frame they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedSeries {
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl ConvertedSeries {
    /// Multiplies every close by `rate`, keeping the date index.
    pub fn convert(frame: &HistoryFrame, rate: f64) -> Self {
        let mut prices = Vec::with_capacity(frame.len());
        for close in frame.close() {
            prices.push(close * rate);
        }
        ConvertedSeries {
            dates: frame.dates().to_vec(),
            prices,
        }
    }

    /// Builds a series from raw columns, e.g. for rendering stored data.
    pub fn from_parts(dates: Vec<NaiveDate>, prices: Vec<f64>) -> TrackerResult<Self> {
        if dates.len() != prices.len() {
            return Err(TrackerError::PlotError(format!(
                "{} dates but {} prices",
                dates.len(),
                prices.len()
            )));
        }
        Ok(ConvertedSeries { dates, prices })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        self.dates.last().copied().zip(self.prices.last().copied())
    }
}

/// A source of daily price history.
///
/// Implementations return an empty vector when the provider knows nothing
/// about the symbol; transport and authorization failures are
/// [`TrackerError::ProviderError`].
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn history(&self, symbol: &Symbol, period: Period) -> TrackerResult<Vec<Bar>>;
}
