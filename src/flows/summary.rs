//! Narrative summary from the aggregated portfolio

use crate::flow::{invoke, GenerativeModel, PromptPart, StructuredPrompt};
use crate::models::SummaryResult;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInput {
    /// Holding lines with ticker, sector and weight
    pub holdings: String,
    pub sector_allocation: String,
    pub diversification_insights: String,
}

pub struct SummaryPrompt;

impl StructuredPrompt for SummaryPrompt {
    type Input = SummaryInput;
    type Output = SummaryResult;

    const NAME: &'static str = "generatePortfolioSummaryPrompt";

    fn output_schema() -> Value {
        super::narrative_schema()
    }

    fn render(input: &SummaryInput) -> Result<Vec<PromptPart>> {
        let text = format!(
            r#"You are an expert financial analyst providing insights on investment portfolios.

Based on the following portfolio information, generate a readable summary highlighting what's working well, potential risks, and sectors/stocks to consider.
Also, provide recommendations on whether to hold, sell, or consider buying specific assets. Identify potential missing or underexposed sectors within the user's portfolio.

Holdings: {}
Sector Allocation: {}
Diversification Insights: {}

Summary:
Recommendations:
Missing Sectors:"#,
            input.holdings, input.sector_allocation, input.diversification_insights
        );

        Ok(vec![PromptPart::Text(text)])
    }
}

/// Single invocation; errors propagate to the caller.
pub async fn generate_portfolio_summary(
    model: &dyn GenerativeModel,
    input: &SummaryInput,
) -> Result<SummaryResult> {
    invoke::<SummaryPrompt>(model, input).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::flow::ScriptedModel;
    use serde_json::json;

    fn input() -> SummaryInput {
        SummaryInput {
            holdings: "AAPL (Tech): 50.00%".to_string(),
            sector_allocation: "Tech: 100.00%".to_string(),
            diversification_insights: "The portfolio consists of 1 holdings across 1 unique sectors.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_prompt_interpolates_all_fields() {
        let model = ScriptedModel::new().reply_json(json!({
            "summary": "Concentrated.",
            "recommendations": "Trim AAPL.",
            "missingSectors": "Utilities."
        }));

        let result = generate_portfolio_summary(&model, &input()).await.unwrap();
        assert_eq!(result.missing_sectors, "Utilities.");

        let text = model.requests()[0].text();
        assert!(text.contains("Holdings: AAPL (Tech): 50.00%"));
        assert!(text.contains("Sector Allocation: Tech: 100.00%"));
        assert!(text.contains("1 holdings across 1 unique sectors"));
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let model = ScriptedModel::new().reply_json(json!({
            "summary": "Concentrated.",
            "recommendations": "Trim AAPL."
        }));

        let err = generate_portfolio_summary(&model, &input()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
    }
}
