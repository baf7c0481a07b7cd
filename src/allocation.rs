//! Sector allocation and diversification engine
//!
//! Pure and deterministic: no network, no clock, no randomness.
//! The narrative prompt consumes the two text blocks produced here.

use crate::models::{DiversificationStats, Holding, SectorAllocationEntry};
use std::collections::HashMap;

/// Chart colors, assigned by entry position modulo length
pub const CHART_PALETTE: [&str; 5] = [
    "hsl(var(--chart-1))",
    "hsl(var(--chart-2))",
    "hsl(var(--chart-3))",
    "hsl(var(--chart-4))",
    "hsl(var(--chart-5))",
];

/// Everything derived from a list of holdings
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioAggregation {
    pub sector_allocation: Vec<SectorAllocationEntry>,
    pub diversification: DiversificationStats,
    /// One `"<ticker> (<sector>): <pct>%"` line per holding
    pub holdings_text: String,
    /// Comma-joined `"<sector>: <pct>%"`
    pub allocation_text: String,
}

/// Roll holdings up by sector, keeping first-seen sector order.
pub fn aggregate(holdings: &[Holding]) -> PortfolioAggregation {
    let sector_weights = sum_by_sector(holdings);

    let sector_allocation: Vec<SectorAllocationEntry> = sector_weights
        .into_iter()
        .enumerate()
        .map(|(index, (sector, weight))| SectorAllocationEntry {
            sector: sector.to_string(),
            weight: round2(weight * 100.0),
            fill: CHART_PALETTE[index % CHART_PALETTE.len()].to_string(),
        })
        .collect();

    let diversification = DiversificationStats {
        total_holdings: holdings.len(),
        unique_sectors: sector_allocation.len(),
    };

    PortfolioAggregation {
        holdings_text: format_holdings(holdings),
        allocation_text: format_allocation(&sector_allocation),
        sector_allocation,
        diversification,
    }
}

/// Sentence handed to the narrative prompt
pub fn diversification_insights(stats: &DiversificationStats) -> String {
    format!(
        "The portfolio consists of {} holdings across {} unique sectors.",
        stats.total_holdings, stats.unique_sectors
    )
}

/// Ordered (sector, fractional sum) pairs in first-seen order
fn sum_by_sector(holdings: &[Holding]) -> Vec<(&str, f64)> {
    let mut index_by_sector: HashMap<&str, usize> = HashMap::with_capacity(holdings.len());
    let mut sums: Vec<(&str, f64)> = Vec::new();

    for holding in holdings {
        match index_by_sector.get(holding.sector.as_str()) {
            Some(&i) => sums[i].1 += holding.weight,
            None => {
                index_by_sector.insert(holding.sector.as_str(), sums.len());
                sums.push((holding.sector.as_str(), holding.weight));
            }
        }
    }

    sums
}

/// Two decimals, exact ties away from zero. `{:.2}` alone would round
/// 0.125 down to "0.12". Adding 0.0 folds -0.0 into 0.0.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

fn format_holdings(holdings: &[Holding]) -> String {
    holdings
        .iter()
        .map(|h| format!("{} ({}): {:.2}%", h.ticker, h.sector, round2(h.weight * 100.0)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_allocation(entries: &[SectorAllocationEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}: {:.2}%", e.sector, e.weight))
        .collect::<Vec<_>>()
        .join(", ")
}
