use portfolio_insight::{flow::data_uri, AnalyzerConfig, PortfolioAnalyzer};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(image_path) = std::env::args().nth(1) else {
        eprintln!("Usage: portfolio-insight <portfolio-screenshot>");
        std::process::exit(2);
    };

    let config = AnalyzerConfig::from_env();
    let analyzer = PortfolioAnalyzer::from_config(&config)?;

    let path = Path::new(&image_path);
    let bytes = tokio::fs::read(path).await?;
    let mime_type = data_uri::mime_type_for_extension(path.extension().and_then(|e| e.to_str()));

    info!(path = %path.display(), mime_type, bytes = bytes.len(), "Analyzing screenshot");

    match analyzer
        .analyze_and_summarize(&data_uri::encode(mime_type, &bytes))
        .await
    {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
