//! services/api/src/adapters/qa_llm.rs
//!
//! This module contains the adapter for the question-answering LLM. It
//! implements the `QuestionAnsweringService` port from the `core` crate.
//!
//! The prompt restricts the model to the stored source content; there is no
//! retrieval ranking, the whole text is sent verbatim.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    error::OpenAIError,
    Client,
};
use async_trait::async_trait;
use studylens_core::domain::QaResult;
use studylens_core::ports::{PortError, PortResult, QuestionAnsweringService};
use tracing::error;

const ANSWER_MAX_TOKENS: u32 = 800;
const DEFAULT_CONFIDENCE: f64 = 0.5;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `QuestionAnsweringService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQaAdapter {
    /// Creates a new `OpenAiQaAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    async fn try_answer(
        &self,
        question: &str,
        content: &str,
        title: &str,
    ) -> PortResult<QaResult> {
        let prompt = format!(
            "Context: The following content is from \"{title}\"\n\
             Content: {content}\n\n\
             User question: {question}\n\n\
             Please answer the question based ONLY on the provided content. If the answer \
             cannot be determined from the content, respond with \"I don't know from the \
             provided content.\"\n\n\
             Respond with JSON in this format:\n\
             {{\n\
               \"answer\": \"Your detailed answer here\",\n\
               \"sourceChunks\": [\"relevant section 1\", \"relevant section 2\"],\n\
               \"confidence\": 0.95\n\
             }}\n\n\
             Include source references and confidence score (0-1)."
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
            .max_tokens(ANSWER_MAX_TOKENS)
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

        parse_answer(&raw)
    }
}

/// Parses the model's JSON payload. A syntactically broken body is an error;
/// individually missing fields fall back to defaults.
fn parse_answer(raw: &str) -> PortResult<QaResult> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| PortError::Unexpected(e.to_string()))?;

    let answer = value
        .get("answer")
        .and_then(|v| v.as_str())
        .unwrap_or("Unable to generate answer")
        .to_string();
    let source_chunks = value
        .get("sourceChunks")
        .and_then(|v| v.as_array())
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|c| c.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    let confidence = value
        .get("confidence")
        .and_then(|v| v.as_f64())
        .unwrap_or(DEFAULT_CONFIDENCE);

    Ok(QaResult {
        answer,
        source_chunks,
        confidence,
    })
}

//=========================================================================================
// `QuestionAnsweringService` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuestionAnsweringService for OpenAiQaAdapter {
    /// Answers a question from the stored content, wrapping any transport or
    /// parse failure into one generic error.
    async fn answer(&self, question: &str, content: &str, title: &str) -> PortResult<QaResult> {
        self.try_answer(question, content, title).await.map_err(|e| {
            error!("Error answering question: {:?}", e);
            PortError::ExternalService("Failed to answer question".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_payload_parses() {
        let result = parse_answer(
            r#"{"answer": "Yes.", "sourceChunks": ["chunk one"], "confidence": 0.9}"#,
        )
        .unwrap();
        assert_eq!(result.answer, "Yes.");
        assert_eq!(result.source_chunks, vec!["chunk one"]);
        assert!((result.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let result = parse_answer("{}").unwrap();
        assert_eq!(result.answer, "Unable to generate answer");
        assert!(result.source_chunks.is_empty());
        assert!((result.confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn broken_json_is_an_error() {
        assert!(parse_answer("<!doctype html>").is_err());
    }
}
