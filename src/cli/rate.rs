use super::ui;
use crate::core::currency::RateSource;
use crate::core::pipeline::PricePipeline;
use anyhow::Result;

/// Runs the rate cascade once and prints where the rate came from.
pub async fn run(pipeline: &PricePipeline) -> Result<()> {
    let pb = ui::new_spinner("Fetching USD→NPR rate...".to_string());
    let rate = pipeline.rate().await;
    pb.finish_and_clear();

    println!("{}", ui::rate_banner(&rate));
    match rate.source {
        RateSource::Live => {}
        RateSource::Cache => println!(
            "{}",
            ui::style_text(
                "All rate providers failed; showing the last cached rate.",
                ui::StyleType::Subtle
            )
        ),
        RateSource::Default => println!(
            "{}",
            ui::style_text(
                "All rate providers failed and nothing is cached; showing the default rate.",
                ui::StyleType::Subtle
            )
        ),
    }
    Ok(())
}
