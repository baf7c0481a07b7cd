//! Prompt definitions handed to the model invoker

use crate::flow::StructuredPrompt;
use serde_json::{json, Value};

pub mod extraction;
pub mod missing_sectors;
pub mod recommendations;
pub mod summary;

pub use extraction::{analyze_portfolio_image, ExtractionInput, ExtractionPrompt};
pub use missing_sectors::{identify_missing_sectors, MissingSectorsPrompt, PortfolioHoldingsInput};
pub use recommendations::{get_investment_recommendations, RecommendationsPrompt};
pub use summary::{generate_portfolio_summary, SummaryInput, SummaryPrompt};

/// Names of every declared prompt
pub fn registered_prompts() -> Vec<&'static str> {
    vec![
        ExtractionPrompt::NAME,
        SummaryPrompt::NAME,
        RecommendationsPrompt::NAME,
        MissingSectorsPrompt::NAME,
    ]
}

/// Schema for summary / recommendations / missingSectors output
pub(crate) fn narrative_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A readable summary of the portfolio, including what is working well, potential risks, and sectors/stocks to consider."
            },
            "recommendations": {
                "type": "STRING",
                "description": "Recommendations on whether to hold, sell, or consider buying specific assets."
            },
            "missingSectors": {
                "type": "STRING",
                "description": "Potential missing or underexposed sectors within the portfolio."
            }
        },
        "required": ["summary", "recommendations", "missingSectors"]
    })
}
