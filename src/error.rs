//! Error types for the portfolio analyzer

use thiserror::Error;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {

    // =============================
    // Pipeline Errors
    // =============================

    #[error("{0}")]
    Configuration(String),

    /// Carries the model's own explanation verbatim.
    #[error("{0}")]
    ExtractionFailed(String),

    #[error("Model output did not match the declared shape: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AnalysisError {
    pub fn missing_credential() -> Self {
        AnalysisError::Configuration(
            "Google AI API key is not configured. Please set the GOOGLE_API_KEY in your .env file and restart the server."
                .to_string(),
        )
    }
}
