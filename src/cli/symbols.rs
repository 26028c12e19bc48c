use super::ui;
use crate::core::symbol::load_symbols;
use anyhow::Result;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let symbols = load_symbols(path);
    println!(
        "{} {}",
        ui::style_text("Symbols", ui::StyleType::Title),
        ui::style_text(&format!("({})", path.display()), ui::StyleType::Subtle)
    );
    for symbol in &symbols {
        println!("  {symbol}");
    }
    Ok(())
}
