//! Hold / sell / buy recommendations from a plain holdings list

use super::missing_sectors::PortfolioHoldingsInput;
use crate::flow::{invoke, GenerativeModel, PromptPart, StructuredPrompt};
use crate::models::SummaryResult;
use crate::Result;
use serde_json::Value;

pub struct RecommendationsPrompt;

impl StructuredPrompt for RecommendationsPrompt {
    type Input = PortfolioHoldingsInput;
    type Output = SummaryResult;

    const NAME: &'static str = "investmentRecommendationsPrompt";

    fn output_schema() -> Value {
        super::narrative_schema()
    }

    fn render(input: &PortfolioHoldingsInput) -> Result<Vec<PromptPart>> {
        Ok(vec![PromptPart::Text(format!(
            r#"You are an investment advisor. Analyze the user's portfolio holdings and provide recommendations.

Portfolio Holdings:
{}

Provide the following:
1.  A summary of the portfolio, including what is working and potential risks.
2.  Recommendations on whether to hold, sell, or consider buying specific assets.
3.  Identification of potential missing or underexposed sectors within the portfolio.
"#,
            input.portfolio_holdings
        ))])
    }
}

pub async fn get_investment_recommendations(
    model: &dyn GenerativeModel,
    input: &PortfolioHoldingsInput,
) -> Result<SummaryResult> {
    invoke::<RecommendationsPrompt>(model, input).await
}
