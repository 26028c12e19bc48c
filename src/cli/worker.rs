//! Background fetch tasks for the interactive app
//!
//! Each request runs on its own tokio task and reports back over an
//! unbounded channel that the UI loop drains between frames.

use crate::core::currency::RateResult;
use crate::core::error::TrackerError;
use crate::core::history::{ConvertedSeries, Period};
use crate::core::pipeline::PricePipeline;
use crate::core::symbol::Symbol;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug)]
pub enum WorkerEvent {
    /// History is in; the rate lookup is still running.
    Fetched {
        id: u64,
        symbol: Symbol,
        records: usize,
    },
    /// Converted series ready to draw.
    Ready {
        id: u64,
        symbol: Symbol,
        series: ConvertedSeries,
        rate: RateResult,
    },
    Failed {
        id: u64,
        error: TrackerError,
    },
}

impl WorkerEvent {
    pub fn id(&self) -> u64 {
        match self {
            WorkerEvent::Fetched { id, .. }
            | WorkerEvent::Ready { id, .. }
            | WorkerEvent::Failed { id, .. } => *id,
        }
    }

    /// Whether the request is finished with this event.
    pub fn is_final(&self) -> bool {
        !matches!(self, WorkerEvent::Fetched { .. })
    }
}

/// Runs history, then rate, for one request.
pub fn spawn_request(
    pipeline: Arc<PricePipeline>,
    id: u64,
    symbol: String,
    period: Period,
    tx: UnboundedSender<WorkerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let event = match run_request(&pipeline, id, &symbol, period, &tx).await {
            Ok(event) => event,
            Err(error) => WorkerEvent::Failed { id, error },
        };
        if tx.send(event).is_err() {
            debug!("UI went away before request {} completed", id);
        }
    })
}

async fn run_request(
    pipeline: &PricePipeline,
    id: u64,
    symbol: &str,
    period: Period,
    tx: &UnboundedSender<WorkerEvent>,
) -> Result<WorkerEvent, TrackerError> {
    let symbol = Symbol::parse(symbol)?;
    let frame = pipeline.fetch(symbol.as_str(), period).await?;
    let _ = tx.send(WorkerEvent::Fetched {
        id,
        symbol: symbol.clone(),
        records: frame.len(),
    });

    let rate = pipeline.rate().await;
    let series = ConvertedSeries::convert(&frame, rate.value);
    Ok(WorkerEvent::Ready {
        id,
        symbol,
        series,
        rate,
    })
}

/// Hands out request ids and decides which completions may reach the screen.
///
/// Only a completion newer than the one on screen is shown, so a slow
/// response can never replace a more recent chart.
#[derive(Debug, Default)]
pub struct DisplayGate {
    issued: u64,
    shown: Option<u64>,
}

impl DisplayGate {
    pub fn next_id(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// True if `id` is newer than what is displayed.
    pub fn is_fresh(&self, id: u64) -> bool {
        self.shown.is_none_or(|shown| id > shown)
    }

    /// Marks `id` as displayed if it is fresh.
    pub fn accept(&mut self, id: u64) -> bool {
        if self.is_fresh(id) {
            self.shown = Some(id);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::renderer::ChartRenderer;
    use crate::core::currency::RateSource;
    use crate::core::error::TrackerResult;
    use crate::core::history::{Bar, HistoryProvider};
    use crate::core::history_fetcher::HistoryFetcher;
    use crate::core::rate_fetcher::RateFetcher;
    use crate::store::rate_cache::RateCache;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    struct TwoBars;

    #[async_trait]
    impl HistoryProvider for TwoBars {
        async fn history(&self, _symbol: &Symbol, _period: Period) -> TrackerResult<Vec<Bar>> {
            Ok([1.0, 2.0]
                .iter()
                .enumerate()
                .map(|(i, close)| Bar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 2 + i as u32).unwrap(),
                    open: *close,
                    high: *close,
                    low: *close,
                    close: *close,
                    volume: 0,
                })
                .collect())
        }
    }

    fn pipeline(dir: &TempDir) -> Arc<PricePipeline> {
        Arc::new(PricePipeline::new(
            HistoryFetcher::new(Arc::new(TwoBars), None),
            RateFetcher::new(Vec::new(), RateCache::new(dir.path().join("rate.txt")), 140.0),
            ChartRenderer::default(),
        ))
    }

    #[tokio::test]
    async fn test_request_reports_fetch_then_ready() {
        let dir = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_request(pipeline(&dir), 7, "msft".into(), Period::FiveDays, tx)
            .await
            .unwrap();

        match rx.recv().await {
            Some(WorkerEvent::Fetched { id, symbol, records }) => {
                assert_eq!((id, symbol.as_str(), records), (7, "MSFT", 2));
            }
            other => panic!("expected Fetched, got {other:?}"),
        }
        match rx.recv().await {
            Some(WorkerEvent::Ready { id, series, rate, .. }) => {
                assert_eq!(id, 7);
                assert_eq!(rate.source, RateSource::Default);
                assert_eq!(series.prices(), &[140.0, 280.0]);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_symbol_reports_failure_only() {
        let dir = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_request(pipeline(&dir), 1, "not a symbol".into(), Period::OneMonth, tx)
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert!(event.is_final());
        assert!(matches!(
            event,
            WorkerEvent::Failed {
                id: 1,
                error: TrackerError::InvalidSymbol(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_closed_channel_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        spawn_request(pipeline(&dir), 1, "AAPL".into(), Period::OneMonth, tx)
            .await
            .unwrap();
    }

    #[test]
    fn test_display_gate_ignores_stale_completions() {
        let mut gate = DisplayGate::default();
        let first = gate.next_id();
        let second = gate.next_id();
        assert!(second > first);

        assert!(gate.accept(second));
        assert!(!gate.is_fresh(first));
        assert!(!gate.accept(first));
        assert!(!gate.accept(second));

        let third = gate.next_id();
        assert!(gate.accept(third));
    }
}
