//! Ticker symbols and the symbol list file

use crate::core::error::{TrackerError, TrackerResult};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

const MAX_SYMBOL_LEN: usize = 10;

/// Symbols offered when the symbol file is missing or yields nothing.
pub const FALLBACK_SYMBOLS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

static SYMBOL_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([A-Z0-9\-\^]+)\*\*").expect("symbol markup regex is valid")
});

/// A validated ticker: 1 to 10 characters from `[A-Z0-9^-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Normalizes user input (trim, upper-case) and validates it.
    pub fn parse(input: &str) -> TrackerResult<Self> {
        let normalized = input.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(TrackerError::InvalidSymbol(
                "Empty symbol provided".to_string(),
            ));
        }
        if normalized.len() > MAX_SYMBOL_LEN {
            return Err(TrackerError::InvalidSymbol(format!(
                "{normalized} is longer than {MAX_SYMBOL_LEN} characters"
            )));
        }
        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '^' || *c == '-'))
        {
            return Err(TrackerError::InvalidSymbol(format!(
                "{normalized} contains unsupported character '{bad}'"
            )));
        }
        Ok(Symbol(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::parse(s)
    }
}

/// Extracts every `**SYMBOL**` occurrence, deduplicated and sorted.
pub fn extract_symbols(text: &str) -> Vec<String> {
    SYMBOL_MARKUP
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Loads the symbol list from a markdown-style file.
///
/// A missing or unreadable file, or one without any marked symbols, yields
/// the sorted fallback list.
pub fn load_symbols<P: AsRef<Path>>(path: P) -> Vec<String> {
    let path = path.as_ref();
    let symbols = match fs::read_to_string(path) {
        Ok(text) => extract_symbols(&text),
        Err(e) => {
            debug!("Symbol file {} not readable: {}", path.display(), e);
            Vec::new()
        }
    };

    if symbols.is_empty() {
        warn!(
            "No symbols found in {}; using fallback list",
            path.display()
        );
        let mut fallback: Vec<String> = FALLBACK_SYMBOLS.iter().map(|s| s.to_string()).collect();
        fallback.sort();
        return fallback;
    }

    debug!("Loaded {} symbols from {}", symbols.len(), path.display());
    symbols
}
