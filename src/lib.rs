//! Portfolio Insight
//!
//! Turns a screenshot of an investment portfolio into:
//! - extracted holdings (ticker, weight, sector)
//! - a sector allocation breakdown and diversification stats
//! - narrative summary, recommendations and missing-sector commentary
//!
//! PIPELINE:
//! IMAGE → EXTRACT (LLM) → AGGREGATE (deterministic) → SUMMARIZE (LLM) → RESULT

pub mod allocation;
pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod flow;
pub mod flows;
pub mod gemini;
pub mod models;

pub use error::Result;

// Re-export common types
pub use analyzer::PortfolioAnalyzer;
pub use config::AnalyzerConfig;
pub use models::*;
