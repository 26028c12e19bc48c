use crate::core::error::{TrackerError, TrackerResult};
use crate::core::history::{HistoryFrame, HistoryProvider, Period};
use crate::core::symbol::Symbol;
use crate::store::snapshot::CsvSnapshot;
use std::sync::Arc;
use tracing::info;

/// Validates the ticker, asks the provider for history and snapshots the
/// result to CSV.
pub struct HistoryFetcher {
    provider: Arc<dyn HistoryProvider>,
    snapshot: Option<CsvSnapshot>,
}

impl HistoryFetcher {
    pub fn new(provider: Arc<dyn HistoryProvider>, snapshot: Option<CsvSnapshot>) -> Self {
        HistoryFetcher { provider, snapshot }
    }

    /// Fails with `InvalidSymbol` before any I/O when `symbol` is unusable,
    /// and with `NoData` when the provider has nothing for it.
    pub async fn fetch(&self, symbol: &str, period: Period) -> TrackerResult<HistoryFrame> {
        let symbol = Symbol::parse(symbol)?;
        info!("Fetching data for {} (period={})", symbol, period);

        let bars = self.provider.history(&symbol, period).await?;
        let frame = HistoryFrame::from_bars(bars)
            .ok_or_else(|| TrackerError::NoData(symbol.to_string()))?;

        if let Some(snapshot) = &self.snapshot {
            snapshot.save(&frame);
        }
        Ok(frame)
    }
}
