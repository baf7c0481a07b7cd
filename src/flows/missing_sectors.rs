//! Missing / underexposed sector identification

use crate::flow::{invoke, GenerativeModel, PromptPart, StructuredPrompt};
use crate::models::MissingSectorsResult;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHoldingsInput {
    /// Holdings, sectors and weights as free text
    pub portfolio_holdings: String,
}

pub struct MissingSectorsPrompt;

impl StructuredPrompt for MissingSectorsPrompt {
    type Input = PortfolioHoldingsInput;
    type Output = MissingSectorsResult;

    const NAME: &'static str = "identifyMissingSectorsPrompt";

    fn output_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "missingSectors": {
                    "type": "STRING",
                    "description": "Sectors that are missing or underexposed in the portfolio, with a brief explanation of why they might be beneficial to include."
                }
            },
            "required": ["missingSectors"]
        })
    }

    fn render(input: &PortfolioHoldingsInput) -> Result<Vec<PromptPart>> {
        Ok(vec![PromptPart::Text(format!(
            r#"You are a financial advisor who specializes in portfolio diversification.

Based on the user's current portfolio holdings, identify any sectors that are missing or underexposed.

Consider the overall market conditions and the user's stated investment goals (if available).

Portfolio Holdings: {}

Provide a list of missing or underexposed sectors, along with a brief explanation of why they might be beneficial to include in the portfolio."#,
            input.portfolio_holdings
        ))])
    }
}

pub async fn identify_missing_sectors(
    model: &dyn GenerativeModel,
    input: &PortfolioHoldingsInput,
) -> Result<MissingSectorsResult> {
    invoke::<MissingSectorsPrompt>(model, input).await
}
