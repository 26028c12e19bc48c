use crate::core::error::{TrackerError, TrackerResult};
use crate::core::history::{Bar, HistoryProvider, Period};
use crate::core::symbol::Symbol;
use crate::providers::util::with_retry;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Daily history from the Yahoo Finance chart API.
pub struct YahooHistoryProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooHistoryProvider {
    /// `timeout` bounds each attempt, from connect to the end of the body.
    pub fn new(base_url: &str, timeout: Duration) -> TrackerResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("nprtrack/1.0")
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::ProviderError(format!("HTTP client setup failed: {e}")))?;
        Ok(YahooHistoryProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    currency: Option<String>,
    #[serde(alias = "gmtoffset", default)]
    gmt_offset: i64,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug, Default)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn value_at<T: Copy>(column: &[Option<T>], index: usize) -> Option<T> {
    column.get(index).copied().flatten()
}

/// Turns one chart item into bars, dropping rows without a close.
fn extract_bars(item: &ChartItem) -> Vec<Bar> {
    let (Some(timestamps), Some(quote)) = (
        item.timestamp.as_ref(),
        item.indicators.as_ref().and_then(|inds| inds.quote.first()),
    ) else {
        return Vec::new();
    };

    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let close = value_at(&quote.close, i)?;
            // Shift to the exchange's local calendar day.
            let date = DateTime::from_timestamp(ts + item.meta.gmt_offset, 0)?.date_naive();
            Some(Bar {
                date,
                open: value_at(&quote.open, i).unwrap_or(close),
                high: value_at(&quote.high, i).unwrap_or(close),
                low: value_at(&quote.low, i).unwrap_or(close),
                close,
                volume: value_at(&quote.volume, i).unwrap_or(0),
            })
        })
        .collect()
}

#[async_trait]
impl HistoryProvider for YahooHistoryProvider {
    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(symbol = %symbol, period = %period)
    )]
    async fn history(&self, symbol: &Symbol, period: Period) -> TrackerResult<Vec<Bar>> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}",
            self.base_url,
            symbol,
            period.code()
        );
        debug!("Requesting price history from {}", url);

        let response = with_retry(|| async { self.client.get(&url).send().await }, 2, 500)
            .await
            .map_err(|e| {
                TrackerError::ProviderError(format!(
                    "Request error: {e} for symbol: {symbol} URL: {url}"
                ))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            TrackerError::ProviderError(format!("Failed to read response for {symbol}: {e}"))
        })?;

        if !status.is_success() {
            // Unknown tickers come back as 404 with a chart error payload.
            if status == StatusCode::NOT_FOUND {
                if let Ok(data) = serde_json::from_str::<YahooChartResponse>(&text) {
                    if let Some(err) = data.chart.error {
                        debug!(
                            "Yahoo has no data for {}: {} {}",
                            symbol,
                            err.code,
                            err.description.unwrap_or_default()
                        );
                        return Ok(Vec::new());
                    }
                }
            }
            return Err(TrackerError::ProviderError(format!(
                "HTTP error: {status} for symbol: {symbol}"
            )));
        }

        let data: YahooChartResponse = serde_json::from_str(&text).map_err(|e| {
            TrackerError::ProviderError(format!(
                "Failed to parse JSON response for {symbol}: {e}"
            ))
        })?;

        let Some(item) = data.chart.result.as_ref().and_then(|items| items.first()) else {
            return Ok(Vec::new());
        };

        if let Some(currency) = item.meta.currency.as_deref() {
            if currency != "USD" {
                warn!("{} is quoted in {}, not USD", symbol, currency);
            }
        }

        let bars = extract_bars(item);
        debug!("Received {} bars for {}", bars.len(), symbol);
        Ok(bars)
    }
}
