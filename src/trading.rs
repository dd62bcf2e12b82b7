// src/trading.rs
use crate::error::{QuoteError, TradeError};
use crate::quote::{Quote, QuoteSource};
use log::{info, warn};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub shares: u32,
    pub price: f64,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TradingDesk {
    pub selected: Option<Quote>,
    pub holdings: BTreeMap<String, Holding>,
}

impl TradingDesk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `symbol` and makes it the selected quote. A failed lookup
    /// clears the selection but leaves holdings alone.
    pub async fn search<Q: QuoteSource>(
        &mut self,
        source: &Q,
        symbol: &str,
    ) -> Result<Option<&Quote>, QuoteError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Ok(self.selected.as_ref());
        }
        match source.quote(&symbol).await {
            Ok(quote) => {
                info!("Selected {} at {:.2}", quote.symbol, quote.price);
                self.selected = Some(quote);
                Ok(self.selected.as_ref())
            }
            Err(e) => {
                warn!("Quote lookup for {} failed: {}", symbol, e);
                self.selected = None;
                Err(e)
            }
        }
    }

    /// Buys one share of the selected stock. Repeat buys keep the first price.
    pub fn buy(&mut self) -> Result<&Holding, TradeError> {
        let quote = self.selected.as_ref().ok_or(TradeError::NoQuoteSelected)?;
        match self.holdings.entry(quote.symbol.clone()) {
            Entry::Occupied(entry) => {
                let holding = entry.into_mut();
                holding.shares = holding
                    .shares
                    .checked_add(1)
                    .ok_or_else(|| TradeError::ShareLimit(quote.symbol.clone()))?;
                Ok(holding)
            }
            Entry::Vacant(entry) => Ok(entry.insert(Holding {
                shares: 1,
                price: quote.price,
            })),
        }
    }

    /// Sells one share of the selected stock, dropping the holding at zero.
    /// Returns the shares left.
    pub fn sell(&mut self) -> Result<u32, TradeError> {
        let quote = self.selected.as_ref().ok_or(TradeError::NoQuoteSelected)?;
        let symbol = quote.symbol.clone();
        let holding = self
            .holdings
            .get_mut(&symbol)
            .ok_or_else(|| TradeError::NotHeld(symbol.clone()))?;
        if holding.shares > 1 {
            holding.shares -= 1;
            Ok(holding.shares)
        } else {
            self.holdings.remove(&symbol);
            Ok(0)
        }
    }
}
