pub mod chart;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use crate::core::config;

use crate::chart::renderer::ChartRenderer;
use crate::chart::widget::InlinePresenter;
use crate::core::history::Period;
use crate::core::pipeline::PricePipeline;
use crate::core::symbol::load_symbols;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Height in rows of a chart drawn below the `fetch` output.
const INLINE_CHART_HEIGHT: u16 = 24;

/// Commands that need a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Symbols,
    Fetch {
        symbol: String,
        period: Option<Period>,
        plot: bool,
        /// Also write the drawn chart to this file.
        save: Option<PathBuf>,
    },
    Rate,
    Alert {
        symbol: String,
        target: f64,
        recipient: String,
    },
    App,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("nprtrack starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Symbols => cli::symbols::run(&config.symbols_file),
        AppCommand::Fetch {
            symbol,
            period,
            plot,
            save,
        } => {
            let renderer = ChartRenderer::new(&config.chart)
                .with_presenter(Arc::new(InlinePresenter::new(INLINE_CHART_HEIGHT)));
            let pipeline = PricePipeline::from_config(&config)?.with_renderer(renderer);
            let period = period.unwrap_or(config.period);
            cli::fetch::run(&pipeline, &symbol, period, plot, save.as_deref()).await
        }
        AppCommand::Rate => {
            let pipeline = PricePipeline::from_config(&config)?;
            cli::rate::run(&pipeline).await
        }
        AppCommand::Alert {
            symbol,
            target,
            recipient,
        } => cli::alert::run(&config, &symbol, target, &recipient).await,
        AppCommand::App => {
            let pipeline = Arc::new(PricePipeline::from_config(&config)?);
            let symbols = load_symbols(&config.symbols_file);
            cli::app::run(pipeline, symbols, config.period).await
        }
    }
}
