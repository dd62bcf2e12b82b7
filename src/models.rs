// src/models.rs
use crate::error::PortfolioError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(pub u64);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One held stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPosition {
    pub id: PositionId,
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub buy_price: f64,
    pub current_price: f64,
}

impl StockPosition {
    /// Fractional return since purchase, e.g. `0.17` for +17%.
    pub fn return_ratio(&self) -> f64 {
        (self.current_price - self.buy_price) / self.buy_price
    }

    pub fn validate(&self) -> Result<(), PortfolioError> {
        check_text("symbol", &self.symbol)?;
        check_text("name", &self.name)?;
        check_positive("quantity", self.quantity)?;
        check_positive("buyPrice", self.buy_price)?;
        check_positive("currentPrice", self.current_price)
    }
}

/// Fields a caller supplies on add and update. `current_price` falls back to
/// `buy_price` when no live price is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInput {
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub buy_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
}

impl PositionInput {
    pub fn new(symbol: &str, name: &str, quantity: f64, buy_price: f64) -> Self {
        PositionInput {
            symbol: symbol.to_string(),
            name: name.to_string(),
            quantity,
            buy_price,
            current_price: None,
        }
    }

    pub fn validate(&self) -> Result<(), PortfolioError> {
        check_text("symbol", &self.symbol)?;
        check_text("name", &self.name)?;
        check_positive("quantity", self.quantity)?;
        check_positive("buyPrice", self.buy_price)?;
        if let Some(price) = self.current_price {
            check_positive("currentPrice", price)?;
        }
        Ok(())
    }

    /// Builds the stored record. Callers validate first.
    pub fn into_position(self, id: PositionId) -> StockPosition {
        let current_price = self.current_price.unwrap_or(self.buy_price);
        StockPosition {
            id,
            symbol: self.symbol.trim().to_string(),
            name: self.name.trim().to_string(),
            quantity: self.quantity,
            buy_price: self.buy_price,
            current_price,
        }
    }
}

/// Snapshot of the portfolio as views see it. Never mutated after publication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub positions: Vec<StockPosition>,
    pub loading: bool,
    pub error: Option<String>,
}

impl PortfolioState {
    pub fn with_positions(positions: Vec<StockPosition>) -> Self {
        PortfolioState {
            positions,
            loading: false,
            error: None,
        }
    }

    pub fn find(&self, id: PositionId) -> Option<&StockPosition> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn max_id(&self) -> Option<PositionId> {
        self.positions.iter().map(|p| p.id).max()
    }
}

fn check_text(field: &str, value: &str) -> Result<(), PortfolioError> {
    if value.trim().is_empty() {
        return Err(PortfolioError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn check_positive(field: &str, value: f64) -> Result<(), PortfolioError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PortfolioError::Validation(format!(
            "{} must be a positive number, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Holdings the application starts with.
pub fn seed_positions() -> Vec<StockPosition> {
    let rows = [
        (1, "AAPL", "Apple Inc.", 10.0, 150.00, 175.50),
        (2, "GOOGL", "Alphabet Inc.", 5.0, 2800.00, 2950.00),
        (3, "MSFT", "Microsoft Corporation", 8.0, 300.00, 325.50),
        (4, "AMZN", "Amazon.com, Inc.", 3.0, 3000.00, 3050.00),
        (5, "TSLA", "Tesla, Inc.", 2.0, 800.00, 850.00),
    ];
    rows.iter()
        .map(
            |&(id, symbol, name, quantity, buy_price, current_price)| StockPosition {
                id: PositionId(id),
                symbol: symbol.to_string(),
                name: name.to_string(),
                quantity,
                buy_price,
                current_price,
            },
        )
        .collect()
}
