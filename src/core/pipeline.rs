//! History fetch, FX conversion and chart rendering in one place

use crate::chart::figure::Figure;
use crate::chart::renderer::{ChartRenderer, Rendered};
use crate::core::config::AppConfig;
use crate::core::currency::{CurrencyRateProvider, RateResult};
use crate::core::error::TrackerResult;
use crate::core::history::{ConvertedSeries, HistoryFrame, Period};
use crate::core::history_fetcher::HistoryFetcher;
use crate::core::rate_fetcher::RateFetcher;
use crate::core::symbol::Symbol;
use crate::providers::exchange_rate::HttpRateProvider;
use crate::providers::yahoo_finance::YahooHistoryProvider;
use crate::store::rate_cache::RateCache;
use crate::store::snapshot::CsvSnapshot;
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a caller needs to show a converted price history.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub frame: HistoryFrame,
    pub series: ConvertedSeries,
    pub rate: RateResult,
}

pub struct PricePipeline {
    history: HistoryFetcher,
    rates: RateFetcher,
    renderer: ChartRenderer,
}

impl PricePipeline {
    pub fn new(history: HistoryFetcher, rates: RateFetcher, renderer: ChartRenderer) -> Self {
        PricePipeline {
            history,
            rates,
            renderer,
        }
    }

    /// Wires the Yahoo provider, the configured rate endpoints and the file
    /// stores named in `config`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let yahoo_config = &config.providers.yahoo;
        let yahoo = YahooHistoryProvider::new(&yahoo_config.base_url, yahoo_config.timeout())
            .context("Failed to create market data provider")?;
        let history = HistoryFetcher::new(
            Arc::new(yahoo),
            Some(CsvSnapshot::new(&config.snapshot_path)),
        );

        let rates_config = &config.providers.rates;
        let timeout = rates_config.timeout();
        let mut providers: Vec<Box<dyn CurrencyRateProvider>> = Vec::new();
        for endpoint in &rates_config.endpoints {
            match HttpRateProvider::new(endpoint, timeout) {
                Ok(provider) => providers.push(Box::new(provider)),
                Err(e) => warn!("Skipping rate endpoint {}: {:#}", endpoint.url, e),
            }
        }
        debug!("Configured {} rate providers", providers.len());

        let rates = RateFetcher::new(
            providers,
            RateCache::new(&config.rate_cache_path),
            rates_config.default_rate,
        );
        Ok(Self::new(history, rates, ChartRenderer::new(&config.chart)))
    }

    pub fn with_renderer(mut self, renderer: ChartRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    /// History only; no rate lookup.
    pub async fn fetch(&self, symbol: &str, period: Period) -> TrackerResult<HistoryFrame> {
        self.history.fetch(symbol, period).await
    }

    pub async fn rate(&self) -> RateResult {
        self.rates.fetch().await
    }

    /// Fetches history and then the rate. A failed history fetch returns
    /// before any rate provider is contacted.
    pub async fn build(&self, symbol: &str, period: Period) -> TrackerResult<PipelineOutput> {
        let frame = self.history.fetch(symbol, period).await?;
        let rate = self.rates.fetch().await;
        let series = ConvertedSeries::convert(&frame, rate.value);
        Ok(PipelineOutput {
            frame,
            series,
            rate,
        })
    }

    /// Converts an already fetched frame at the current rate and draws it,
    /// into `target` when given.
    pub async fn plot<'a>(
        &self,
        frame: &HistoryFrame,
        symbol: &str,
        target: Option<&'a mut Figure>,
    ) -> TrackerResult<Rendered<'a>> {
        let symbol = Symbol::parse(symbol)?;
        let rate = self.rates.fetch().await;
        let series = ConvertedSeries::convert(frame, rate.value);
        self.renderer.render(&symbol, &series, rate, target)
    }
}
