use super::ui;
use crate::core::alert::{EmailNotifier, check_alert};
use crate::core::config::AppConfig;
use crate::providers::yahoo_finance::YahooHistoryProvider;
use anyhow::{Context, Result};

pub async fn run(config: &AppConfig, symbol: &str, target: f64, recipient: &str) -> Result<()> {
    let yahoo = &config.providers.yahoo;
    let provider = YahooHistoryProvider::new(&yahoo.base_url, yahoo.timeout())?;
    let notifier = EmailNotifier::from_config(&config.alert, recipient)
        .context("Email alerts are not configured")?;

    let outcome = check_alert(&provider, symbol, target, &notifier).await?;

    let status = if outcome.triggered {
        ui::style_text(&format!("alert sent to {recipient}"), ui::StyleType::Good)
    } else {
        ui::style_text("below target, no alert", ui::StyleType::Subtle)
    };
    println!(
        "{}: ${:.2} (target ${:.2}) {}",
        ui::style_text(outcome.symbol.as_str(), ui::StyleType::Label),
        outcome.current,
        outcome.target,
        status
    );
    Ok(())
}
