//! Schema-validated model invocation
//!
//! A prompt declares its input type, its output type and the JSON schema the
//! model is asked to honour. `invoke` renders the prompt, sends it to a
//! `GenerativeModel`, and only hands back output that deserializes into the
//! declared type and passes `validate`.

use crate::error::AnalysisError;
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

pub mod data_uri;
pub use data_uri::ImageDataUri;

/// One piece of a rendered prompt
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    /// Inline base64 media, e.g. a screenshot
    Media { mime_type: String, data: String },
}

/// Fully rendered request for a generation service
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt_name: &'static str,
    pub parts: Vec<PromptPart>,
    pub response_schema: Value,
}

impl ModelRequest {
    /// Concatenated text parts (media omitted)
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                PromptPart::Text(t) => Some(t.as_str()),
                PromptPart::Media { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_media(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, PromptPart::Media { .. }))
    }
}

/// Opaque "structured input in, JSON text out" capability
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: ModelRequest) -> Result<String>;
}

/// Declarative prompt definition
pub trait StructuredPrompt {
    type Input: Serialize + Send + Sync;
    type Output: DeserializeOwned + Send;

    const NAME: &'static str;

    /// JSON schema of `Output`, in the subset Gemini accepts
    fn output_schema() -> Value;

    fn render(input: &Self::Input) -> Result<Vec<PromptPart>>;

    /// Extra checks beyond what serde enforces
    fn validate(_output: &Self::Output) -> Result<()> {
        Ok(())
    }
}

/// Render, call, parse and validate. Does not catch anything.
pub async fn invoke<P: StructuredPrompt>(
    model: &dyn GenerativeModel,
    input: &P::Input,
) -> Result<P::Output> {
    let request = ModelRequest {
        prompt_name: P::NAME,
        parts: P::render(input)?,
        response_schema: P::output_schema(),
    };

    debug!(prompt = P::NAME, parts = request.parts.len(), "Invoking model");

    let raw = model.generate(request).await?;
    let output = parse_structured::<P::Output>(&raw).map_err(|e| {
        AnalysisError::Validation(format!("{} returned malformed output: {}", P::NAME, e))
    })?;

    P::validate(&output)?;
    Ok(output)
}

/// Strip an optional markdown fence and deserialize
fn parse_structured<T: DeserializeOwned>(raw: &str) -> std::result::Result<T, serde_json::Error> {
    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(cleaned)
}

/// Scripted model for development & testing.
/// Replies are consumed in order; every request is recorded.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, body: impl Into<String>) -> Self {
        self.push(Ok(body.into()));
        self
    }

    pub fn reply_json(self, body: Value) -> Self {
        self.reply(body.to_string())
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|r| r.to_vec())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn push(&self, reply: std::result::Result<String, String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: ModelRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| AnalysisError::Llm("scripted model poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(AnalysisError::Llm(message)),
            None => Err(AnalysisError::Llm("No scripted reply left".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Echo {
        value: u32,
    }

    struct EchoPrompt;

    impl StructuredPrompt for EchoPrompt {
        type Input = String;
        type Output = Echo;

        const NAME: &'static str = "echoPrompt";

        fn output_schema() -> Value {
            json!({ "type": "OBJECT", "properties": { "value": { "type": "INTEGER" } } })
        }

        fn render(input: &String) -> Result<Vec<PromptPart>> {
            Ok(vec![PromptPart::Text(format!("Echo {}", input))])
        }

        fn validate(output: &Echo) -> Result<()> {
            if output.value > 100 {
                return Err(AnalysisError::Validation("value too large".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_invoke_parses_declared_shape() {
        let model = ScriptedModel::new().reply(r#"{"value": 7}"#);

        let out = invoke::<EchoPrompt>(&model, &"seven".to_string()).await.unwrap();
        assert_eq!(out.value, 7);

        let requests = model.requests();
        assert_eq!(requests[0].prompt_name, "echoPrompt");
        assert_eq!(requests[0].text(), "Echo seven");
        assert!(!requests[0].has_media());
    }

    #[tokio::test]
    async fn test_invoke_strips_markdown_fence() {
        let model = ScriptedModel::new().reply("```json\n{\"value\": 3}\n```");

        let out = invoke::<EchoPrompt>(&model, &"x".to_string()).await.unwrap();
        assert_eq!(out.value, 3);
    }

    #[tokio::test]
    async fn test_invoke_rejects_wrong_shape() {
        let model = ScriptedModel::new().reply(r#"{"other": "field"}"#);

        let err = invoke::<EchoPrompt>(&model, &"x".to_string()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
        assert!(err.to_string().contains("echoPrompt"));
    }

    #[tokio::test]
    async fn test_invoke_runs_validate_hook() {
        let model = ScriptedModel::new().reply(r#"{"value": 500}"#);

        let err = invoke::<EchoPrompt>(&model, &"x".to_string()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
    }

    #[tokio::test]
    async fn test_invoke_propagates_model_error() {
        let model = ScriptedModel::new().fail("quota exceeded");

        let err = invoke::<EchoPrompt>(&model, &"x".to_string()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Llm(_)));
        assert_eq!(model.call_count(), 1);
    }
}
