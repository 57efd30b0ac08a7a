//! How the workflow writes stock changes back to the catalog.

use std::str::FromStr;

use thiserror::Error;

/// Stock write strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StockStrategy {
    /// Read the stock, compute the new absolute value and overwrite it.
    ///
    /// Two concurrent checkouts of the same product can both pass the stock
    /// check and oversell it.
    #[default]
    Overwrite,
    /// Use the catalog's conditional decrement and atomic increment.
    Conditional,
}

impl StockStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStrategy::Overwrite => "overwrite",
            StockStrategy::Conditional => "conditional",
        }
    }
}

impl std::fmt::Display for StockStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown stock strategy {0:?}, expected \"overwrite\" or \"conditional\"")]
pub struct ParseStockStrategyError(String);

impl FromStr for StockStrategy {
    type Err = ParseStockStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(StockStrategy::Overwrite),
            "conditional" => Ok(StockStrategy::Conditional),
            _ => Err(ParseStockStrategyError(s.to_string())),
        }
    }
}
