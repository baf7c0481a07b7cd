//! Core data models for portfolio analysis

use serde::{Deserialize, Serialize};

//
// ================= Extraction =================
//

/// One portfolio position as read from the screenshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    /// Fractional share of the portfolio (0.10 for 10%).
    pub weight: f64,
    pub sector: String,
}

impl Holding {
    pub fn new(ticker: &str, weight: f64, sector: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            weight,
            sector: sector.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub holdings: Vec<Holding>,
    pub analysis_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AnalysisResult {
    /// Failed extraction with no holdings
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            holdings: Vec::new(),
            analysis_complete: false,
            reason: Some(reason.into()),
        }
    }
}

//
// ================= Narrative =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary: String,
    pub recommendations: String,
    pub missing_sectors: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingSectorsResult {
    pub missing_sectors: String,
}

//
// ================= Aggregation =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorAllocationEntry {
    pub sector: String,
    /// Percentage scale (0-100), rounded to 2 decimals.
    pub weight: f64,
    /// Chart color token
    pub fill: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversificationStats {
    pub total_holdings: usize,
    pub unique_sectors: usize,
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysis {
    pub analysis: AnalysisResult,
    pub summary: SummaryResult,
    pub sector_allocation: Vec<SectorAllocationEntry>,
    pub diversification: DiversificationStats,
}
