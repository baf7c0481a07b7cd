use portfolio_insight::{api::start_server, AnalyzerConfig, PortfolioAnalyzer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AnalyzerConfig::from_env();

    info!("Portfolio Insight - API Server");
    info!(port = config.port, model = %config.model, "Configuration loaded");

    let analyzer = Arc::new(PortfolioAnalyzer::from_config(&config)?);

    info!("Analyzer initialized");

    start_server(analyzer, config.port).await?;

    Ok(())
}
