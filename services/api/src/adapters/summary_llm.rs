//! services/api/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the summarization LLM. It implements
//! the `SummarizationService` port from the `core` crate using the OpenAI
//! chat-completions API in strict JSON mode.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    error::OpenAIError,
    Client,
};
use async_trait::async_trait;
use studylens_core::domain::SummaryResult;
use studylens_core::ports::{PortError, PortResult, SummarizationService};
use tracing::error;

const SUMMARY_MAX_TOKENS: u32 = 1000;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SummarizationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    async fn try_summarize(&self, content: &str, title: &str) -> PortResult<SummaryResult> {
        let prompt = format!(
            "Please analyze the following content titled \"{title}\" and provide:\n\
             1. A concise summary in 3-5 bullet points\n\
             2. Key actionable insights\n\n\
             Content: {content}\n\n\
             Respond with JSON in this format:\n\
             {{\n\
               \"summary\": \"Brief overview paragraph\",\n\
               \"keyPoints\": [\"bullet point 1\", \"bullet point 2\", ...]\n\
             }}"
        );

        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .max_tokens(SUMMARY_MAX_TOKENS)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| "{}".to_string());

        parse_summary(&raw)
    }
}

/// Parses the model's JSON payload. A syntactically broken body is an error;
/// individually missing fields fall back to defaults.
fn parse_summary(raw: &str) -> PortResult<SummaryResult> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| PortError::Unexpected(e.to_string()))?;

    let summary = value
        .get("summary")
        .and_then(|v| v.as_str())
        .unwrap_or("Unable to generate summary")
        .to_string();
    let key_points = value
        .get("keyPoints")
        .and_then(|v| v.as_array())
        .map(|points| {
            points
                .iter()
                .filter_map(|p| p.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    Ok(SummaryResult {
        summary,
        key_points,
    })
}

//=========================================================================================
// `SummarizationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummarizationService for OpenAiSummaryAdapter {
    /// Summarizes the content, wrapping any transport or parse failure into
    /// one generic error so provider details never reach the client.
    async fn summarize(&self, content: &str, title: &str) -> PortResult<SummaryResult> {
        self.try_summarize(content, title).await.map_err(|e| {
            error!("Error generating summary: {:?}", e);
            PortError::ExternalService("Failed to generate summary".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_payload_parses() {
        let result =
            parse_summary(r#"{"summary": "Overview", "keyPoints": ["one", "two"]}"#).unwrap();
        assert_eq!(result.summary, "Overview");
        assert_eq!(result.key_points, vec!["one", "two"]);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let result = parse_summary("{}").unwrap();
        assert_eq!(result.summary, "Unable to generate summary");
        assert!(result.key_points.is_empty());
    }

    #[test]
    fn non_string_key_points_are_skipped() {
        let result = parse_summary(r#"{"summary": "s", "keyPoints": ["a", 1, null]}"#).unwrap();
        assert_eq!(result.key_points, vec!["a"]);
    }

    #[test]
    fn broken_json_is_an_error() {
        assert!(parse_summary("not json").is_err());
    }
}
