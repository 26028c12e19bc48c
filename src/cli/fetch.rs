use super::ui;
use crate::chart::format::format_grouped;
use crate::chart::widget::save_figure;
use crate::core::history::Period;
use crate::core::pipeline::{PipelineOutput, PricePipeline};
use crate::core::symbol::Symbol;
use anyhow::Result;
use comfy_table::{Cell, Table};
use std::path::Path;

/// Fetches history and the current rate for `symbol`, prints them as a
/// table and optionally draws the chart. With `save`, the drawn chart is
/// also written to that file as text.
pub async fn run(
    pipeline: &PricePipeline,
    symbol: &str,
    period: Period,
    plot: bool,
    save: Option<&Path>,
) -> Result<()> {
    let symbol = Symbol::parse(symbol)?;

    let pb = ui::new_spinner(format!("Fetching {symbol}..."));
    let result = pipeline.build(symbol.as_str(), period).await;
    pb.finish_and_clear();
    let output = result?;

    println!(
        "\n{} {}",
        ui::style_text(symbol.as_str(), ui::StyleType::Title),
        ui::style_text(&format!("({period})"), ui::StyleType::Subtle)
    );
    println!("{}", history_table(&output));
    println!(
        "Fetched {} records for {}. {}",
        output.frame.len(),
        symbol,
        ui::rate_banner(&output.rate)
    );

    if plot {
        let rendered = pipeline
            .renderer()
            .render(&symbol, &output.series, output.rate, None)?;
        if let Some(path) = save {
            save_figure(&rendered.figure, path);
        }
    }
    Ok(())
}

fn history_table(output: &PipelineOutput) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Open"),
        ui::header_cell("High"),
        ui::header_cell("Low"),
        ui::header_cell("Close (USD)"),
        ui::header_cell("Volume"),
        ui::header_cell("Close (NPR)"),
    ]);

    let frame = &output.frame;
    for (i, npr) in output.series.prices().iter().enumerate() {
        table.add_row(vec![
            Cell::new(frame.dates()[i].format("%Y-%m-%d")),
            ui::number_cell(format!("{:.2}", frame.open()[i])),
            ui::number_cell(format!("{:.2}", frame.high()[i])),
            ui::number_cell(format!("{:.2}", frame.low()[i])),
            ui::number_cell(format!("{:.2}", frame.close()[i])),
            ui::number_cell(format_grouped(frame.volume()[i] as f64, 0)),
            ui::npr_cell(format_grouped(*npr, 2)),
        ]);
    }
    table
}
