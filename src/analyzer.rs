//! Portfolio analyzer - the single caller-facing entry point
//!
//! CONFIG CHECK → EXTRACT → AGGREGATE → SUMMARIZE → COMPLETE
//!
//! All-or-nothing: the caller gets a full `PortfolioAnalysis` or one error.

use crate::allocation::{aggregate, diversification_insights};
use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::flow::{GenerativeModel, ImageDataUri};
use crate::flows::{
    analyze_portfolio_image, generate_portfolio_summary, get_investment_recommendations,
    identify_missing_sectors, ExtractionInput, PortfolioHoldingsInput, SummaryInput,
};
use crate::gemini::GeminiClient;
use crate::models::{MissingSectorsResult, PortfolioAnalysis, SummaryResult};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

const DEFAULT_EXTRACTION_FAILURE: &str = "Could not analyze portfolio from image.";

pub struct PortfolioAnalyzer {
    model: Arc<dyn GenerativeModel>,
    credential_configured: bool,
}

impl PortfolioAnalyzer {
    pub fn new(model: Arc<dyn GenerativeModel>, config: &AnalyzerConfig) -> Self {
        Self {
            model,
            credential_configured: config.has_credential(),
        }
    }

    /// Analyzer backed by the Gemini API
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let client = GeminiClient::new(config.api_key.clone().unwrap_or_default(), config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Extract holdings from a screenshot, aggregate them and ask for commentary.
    pub async fn analyze_and_summarize(&self, image_data_uri: &str) -> Result<PortfolioAnalysis> {
        let request_id = Uuid::new_v4();
        let start_time = Instant::now();

        let image_digest = ImageDataUri::parse(image_data_uri)
            .map(|uri| uri.digest())
            .unwrap_or_else(|_| "invalid".to_string());

        info!(%request_id, image = %image_digest, "Analyzer: starting portfolio analysis");

        match self.run_pipeline(image_data_uri).await {
            Ok(result) => {
                info!(
                    %request_id,
                    holdings = result.diversification.total_holdings,
                    sectors = result.diversification.unique_sectors,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Analyzer: analysis complete"
                );
                Ok(result)
            }
            Err(e) => {
                error!(%request_id, "Error in portfolio analysis: {}", e);
                Err(e)
            }
        }
    }

    /// Recommendations for a holdings list the caller already has.
    pub async fn recommend(&self, portfolio_holdings: &str) -> Result<SummaryResult> {
        self.require_credential()?;

        let input = PortfolioHoldingsInput {
            portfolio_holdings: portfolio_holdings.to_string(),
        };
        get_investment_recommendations(self.model.as_ref(), &input)
            .await
            .inspect_err(|e| error!("Error in investment recommendations: {}", e))
    }

    pub async fn identify_missing_sectors(
        &self,
        portfolio_holdings: &str,
    ) -> Result<MissingSectorsResult> {
        self.require_credential()?;

        let input = PortfolioHoldingsInput {
            portfolio_holdings: portfolio_holdings.to_string(),
        };
        identify_missing_sectors(self.model.as_ref(), &input)
            .await
            .inspect_err(|e| error!("Error in missing sector identification: {}", e))
    }

    async fn run_pipeline(&self, image_data_uri: &str) -> Result<PortfolioAnalysis> {
        self.require_credential()?;

        // === EXTRACT ===
        let analysis = analyze_portfolio_image(
            self.model.as_ref(),
            &ExtractionInput {
                portfolio_image_data_uri: image_data_uri.to_string(),
            },
        )
        .await;

        if !analysis.analysis_complete || analysis.holdings.is_empty() {
            let reason = analysis
                .reason
                .as_deref()
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_EXTRACTION_FAILURE);
            return Err(AnalysisError::ExtractionFailed(reason.to_string()));
        }

        // === AGGREGATE ===
        let aggregation = aggregate(&analysis.holdings);
        debug!(allocation = %aggregation.allocation_text, "Sector allocation computed");

        // === SUMMARIZE ===
        let summary = generate_portfolio_summary(
            self.model.as_ref(),
            &SummaryInput {
                holdings: aggregation.holdings_text,
                sector_allocation: aggregation.allocation_text,
                diversification_insights: diversification_insights(&aggregation.diversification),
            },
        )
        .await?;

        Ok(PortfolioAnalysis {
            analysis,
            summary,
            sector_allocation: aggregation.sector_allocation,
            diversification: aggregation.diversification,
        })
    }

    fn require_credential(&self) -> Result<()> {
        if self.credential_configured {
            Ok(())
        } else {
            Err(AnalysisError::missing_credential())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::ScriptedModel;
    use crate::models::DiversificationStats;
    use serde_json::json;

    const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn configured() -> AnalyzerConfig {
        AnalyzerConfig {
            api_key: Some("test-key".to_string()),
            ..AnalyzerConfig::default()
        }
    }

    fn extraction_reply() -> serde_json::Value {
        json!({
            "holdings": [
                { "ticker": "AAPL", "weight": 0.5, "sector": "Tech" },
                { "ticker": "MSFT", "weight": 0.3, "sector": "Tech" },
                { "ticker": "XOM", "weight": 0.2, "sector": "Energy" }
            ],
            "analysisComplete": true
        })
    }

    fn summary_reply() -> serde_json::Value {
        json!({
            "summary": "Tech heavy.",
            "recommendations": "Add defensives.",
            "missingSectors": "Utilities, Health Care."
        })
    }

    fn analyzer(model: &Arc<ScriptedModel>, config: &AnalyzerConfig) -> PortfolioAnalyzer {
        PortfolioAnalyzer::new(model.clone(), config)
    }

    #[tokio::test]
    async fn test_end_to_end_analysis() {
        let model = Arc::new(
            ScriptedModel::new()
                .reply_json(extraction_reply())
                .reply_json(summary_reply()),
        );

        let result = analyzer(&model, &configured())
            .analyze_and_summarize(IMAGE)
            .await
            .unwrap();

        assert_eq!(result.analysis.holdings.len(), 3);
        assert_eq!(result.sector_allocation[0].sector, "Tech");
        assert_eq!(result.sector_allocation[0].weight, 80.0);
        assert_eq!(result.sector_allocation[1].weight, 20.0);
        assert_eq!(
            result.diversification,
            DiversificationStats {
                total_holdings: 3,
                unique_sectors: 2
            }
        );
        assert_eq!(result.summary.recommendations, "Add defensives.");

        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        let summary_prompt = requests[1].text();
        assert!(summary_prompt.contains("AAPL (Tech): 50.00%\nMSFT (Tech): 30.00%"));
        assert!(summary_prompt.contains("Tech: 80.00%, Energy: 20.00%"));
        assert!(summary_prompt
            .contains("The portfolio consists of 3 holdings across 2 unique sectors."));
    }

    #[tokio::test]
    async fn test_incomplete_extraction_surfaces_reason_verbatim() {
        let model = Arc::new(ScriptedModel::new().reply_json(json!({
            "holdings": [],
            "analysisComplete": false,
            "reason": "image unreadable"
        })));

        let err = analyzer(&model, &configured())
            .analyze_and_summarize(IMAGE)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::ExtractionFailed(_)));
        assert_eq!(err.to_string(), "image unreadable");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_holdings_rejected_before_aggregation() {
        let model = Arc::new(ScriptedModel::new().reply_json(json!({
            "holdings": [],
            "analysisComplete": true
        })));

        let err = analyzer(&model, &configured())
            .analyze_and_summarize(IMAGE)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), DEFAULT_EXTRACTION_FAILURE);
        // summary prompt never sent
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_call() {
        let model = Arc::new(ScriptedModel::new().reply_json(extraction_reply()));

        let err = analyzer(&model, &AnalyzerConfig::default())
            .analyze_and_summarize(IMAGE)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Configuration(_)));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_summary_failure_returns_no_partial_result() {
        let model = Arc::new(
            ScriptedModel::new()
                .reply_json(extraction_reply())
                .fail("connection reset by peer"),
        );

        let result = analyzer(&model, &configured())
            .analyze_and_summarize(IMAGE)
            .await;

        let err = tokio_test::assert_err!(result);
        assert!(err.to_string().contains("connection reset by peer"));
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_extraction_service_error_becomes_extraction_failure() {
        let model = Arc::new(ScriptedModel::new().fail("quota exceeded"));

        let err = analyzer(&model, &configured())
            .analyze_and_summarize(IMAGE)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::ExtractionFailed(_)));
        assert_eq!(err.to_string(), "LLM error: quota exceeded");
    }

    #[tokio::test]
    async fn test_recommend_and_missing_sectors() {
        let model = Arc::new(
            ScriptedModel::new()
                .reply_json(summary_reply())
                .reply(r#"{"missingSectors": "Utilities."}"#),
        );
        let analyzer = analyzer(&model, &configured());

        let recs = tokio_test::assert_ok!(analyzer.recommend("AAPL (Tech): 100.00%").await);
        assert_eq!(recs.summary, "Tech heavy.");

        let missing = analyzer
            .identify_missing_sectors("AAPL (Tech): 100.00%")
            .await
            .unwrap();
        assert_eq!(missing.missing_sectors, "Utilities.");
    }

    #[tokio::test]
    async fn test_recommend_requires_credential() {
        let model = Arc::new(ScriptedModel::new());

        let err = analyzer(&model, &AnalyzerConfig::default())
            .recommend("AAPL")
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Configuration(_)));
        assert_eq!(model.call_count(), 0);
    }
}
