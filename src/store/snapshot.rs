//! CSV snapshot of the most recently fetched history

use crate::core::history::HistoryFrame;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CsvSnapshot {
    path: PathBuf,
}

impl CsvSnapshot {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        CsvSnapshot { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `frame`, logging instead of failing.
    pub fn save(&self, frame: &HistoryFrame) {
        match self.try_save(frame) {
            Ok(()) => debug!("Wrote {} rows to {}", frame.len(), self.path.display()),
            Err(e) => warn!("Failed to write CSV; continuing without saving: {e:#}"),
        }
    }

    fn try_save(&self, frame: &HistoryFrame) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        writer.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])?;
        for bar in frame.bars() {
            writer.write_record([
                bar.date.format("%Y-%m-%d").to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ])?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        Ok(())
    }
}
