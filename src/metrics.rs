// src/metrics.rs
use crate::models::StockPosition;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_value: f64,
    pub total_investment: f64,
    pub total_gain: f64,
    pub position_count: usize,
    pub top_performer: Option<StockPosition>,
    pub worst_performer: Option<StockPosition>,
}

/// Per-position row used by the distribution and price charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub symbol: String,
    pub quantity: f64,
    pub current_value: f64,
    pub current_price: f64,
    pub buy_price: f64,
    pub gain_pct: f64,
}

pub fn compute_metrics(positions: &[StockPosition]) -> PortfolioMetrics {
    let total_value: f64 = positions.iter().map(|p| p.quantity * p.current_price).sum();
    let total_investment: f64 = positions.iter().map(|p| p.quantity * p.buy_price).sum();

    PortfolioMetrics {
        total_value,
        total_investment,
        total_gain: total_value - total_investment,
        position_count: positions.len(),
        top_performer: pick_by_return(positions, |candidate, best| candidate > best).cloned(),
        worst_performer: pick_by_return(positions, |candidate, best| candidate < best).cloned(),
    }
}

// Strict comparison keeps the first of equal ratios.
fn pick_by_return<F>(positions: &[StockPosition], better: F) -> Option<&StockPosition>
where
    F: Fn(f64, f64) -> bool,
{
    let mut chosen: Option<(&StockPosition, f64)> = None;
    for position in positions {
        let ratio = position.return_ratio();
        match chosen {
            Some((_, best)) if !better(ratio, best) => {}
            _ => chosen = Some((position, ratio)),
        }
    }
    chosen.map(|(position, _)| position)
}

/// Percentage return since purchase.
pub fn gain_pct(position: &StockPosition) -> f64 {
    position.return_ratio() * 100.0
}

pub fn position_summaries(positions: &[StockPosition]) -> Vec<PositionSummary> {
    positions
        .iter()
        .map(|p| PositionSummary {
            symbol: p.symbol.clone(),
            quantity: p.quantity,
            current_value: p.quantity * p.current_price,
            current_price: p.current_price,
            buy_price: p.buy_price,
            gain_pct: gain_pct(p),
        })
        .collect()
}
