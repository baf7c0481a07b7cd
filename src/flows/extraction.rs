//! Holdings extraction from a portfolio screenshot
//!
//! The only step that absorbs failures: any invocation error becomes an
//! incomplete `AnalysisResult` carrying the error message as its reason.

use crate::flow::{invoke, GenerativeModel, ImageDataUri, PromptPart, StructuredPrompt};
use crate::models::AnalysisResult;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionInput {
    /// `data:<mimetype>;base64,<encoded_data>`
    pub portfolio_image_data_uri: String,
}

pub struct ExtractionPrompt;

const INSTRUCTIONS: &str = r#"You are an expert financial analyst.

You will receive an image of a stock portfolio. Your task is to extract the stock holdings, their weights, and their sector allocations from the image using OCR and AI analysis.

Weights are fractions of the whole portfolio (e.g., 0.10 for 10%).

If you are unable to confidently extract the holdings, weights and sectors, set analysisComplete to false, and set the reason field with an explanation of why you failed. Otherwise, set analysisComplete to true, and the reason field should be omitted.

Here is the portfolio image:"#;

impl StructuredPrompt for ExtractionPrompt {
    type Input = ExtractionInput;
    type Output = AnalysisResult;

    const NAME: &'static str = "analyzePortfolioImagePrompt";

    fn output_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "holdings": {
                    "type": "ARRAY",
                    "description": "The extracted stock holdings, weights, and sectors.",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "ticker": { "type": "STRING", "description": "The ticker symbol of the stock." },
                            "weight": { "type": "NUMBER", "description": "The weight of the stock in the portfolio (e.g., 0.10 for 10%)." },
                            "sector": { "type": "STRING", "description": "The sector of the stock." }
                        },
                        "required": ["ticker", "weight", "sector"]
                    }
                },
                "analysisComplete": {
                    "type": "BOOLEAN",
                    "description": "Whether the analysis was completed successfully."
                },
                "reason": {
                    "type": "STRING",
                    "description": "Reason for failure, if analysis was not completed successfully."
                }
            },
            "required": ["holdings", "analysisComplete"]
        })
    }

    fn render(input: &ExtractionInput) -> Result<Vec<PromptPart>> {
        let image = ImageDataUri::parse(&input.portfolio_image_data_uri)?;

        Ok(vec![
            PromptPart::Text(INSTRUCTIONS.to_string()),
            PromptPart::Media {
                mime_type: image.mime_type.to_string(),
                data: image.data.to_string(),
            },
            PromptPart::Text("Return the data in JSON format.".to_string()),
        ])
    }
}

/// Extract holdings. Never fails; errors are folded into the result.
pub async fn analyze_portfolio_image(
    model: &dyn GenerativeModel,
    input: &ExtractionInput,
) -> AnalysisResult {
    match invoke::<ExtractionPrompt>(model, input).await {
        Ok(result) => {
            info!(
                holdings = result.holdings.len(),
                complete = result.analysis_complete,
                "Portfolio image analyzed"
            );
            result
        }
        Err(e) => {
            error!("Error in portfolio image extraction: {}", e);
            AnalysisResult::failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::ScriptedModel;
    use crate::models::Holding;

    fn input() -> ExtractionInput {
        ExtractionInput {
            portfolio_image_data_uri: "data:image/png;base64,iVBORw0KGgo=".to_string(),
        }
    }

    #[tokio::test]
    async fn test_extraction_success() {
        let model = ScriptedModel::new().reply_json(json!({
            "holdings": [
                { "ticker": "AAPL", "weight": 0.6, "sector": "Technology" },
                { "ticker": "JNJ", "weight": 0.4, "sector": "Health Care" }
            ],
            "analysisComplete": true
        }));

        let result = analyze_portfolio_image(&model, &input()).await;

        assert!(result.analysis_complete);
        assert_eq!(result.holdings[1], Holding::new("JNJ", 0.4, "Health Care"));

        let requests = model.requests();
        let request = &requests[0];
        assert!(request.has_media());
        assert!(request.text().contains("analysisComplete"));
        assert!(matches!(
            &request.parts[1],
            PromptPart::Media { mime_type, data } if mime_type == "image/png" && data == "iVBORw0KGgo="
        ));
    }

    #[tokio::test]
    async fn test_model_reported_failure_passes_through() {
        let model = ScriptedModel::new().reply_json(json!({
            "holdings": [],
            "analysisComplete": false,
            "reason": "image unreadable"
        }));

        let result = analyze_portfolio_image(&model, &input()).await;

        assert!(!result.analysis_complete);
        assert_eq!(result.reason.as_deref(), Some("image unreadable"));
    }

    #[tokio::test]
    async fn test_service_error_is_absorbed() {
        let model = ScriptedModel::new().fail("quota exceeded");

        let result = analyze_portfolio_image(&model, &input()).await;

        assert!(result.holdings.is_empty());
        assert!(!result.analysis_complete);
        assert_eq!(result.reason.as_deref(), Some("LLM error: quota exceeded"));
    }

    #[tokio::test]
    async fn test_malformed_output_is_absorbed() {
        let model = ScriptedModel::new().reply(r#"{"holdings": "AAPL 100%"}"#);

        let result = analyze_portfolio_image(&model, &input()).await;

        assert!(!result.analysis_complete);
        assert!(result
            .reason
            .as_deref()
            .unwrap_or_default()
            .contains("analyzePortfolioImagePrompt"));
    }

    #[tokio::test]
    async fn test_bad_data_uri_never_reaches_model() {
        let model = ScriptedModel::new();
        let bad = ExtractionInput {
            portfolio_image_data_uri: "not-an-image".to_string(),
        };

        let result = analyze_portfolio_image(&model, &bad).await;

        assert!(!result.analysis_complete);
        assert_eq!(model.call_count(), 0);
    }
}
