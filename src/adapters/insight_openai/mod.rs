//! OpenAI-compatible chat completion adapter for insight generation

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::ports::*;

const SYSTEM_PROMPT: &str = "You are an AI assistant that helps extract insights from video transcripts. Your task is to find relevant segments based on the user prompt and return them in a structured format.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Human-readable message from an API error body, `fallback` when absent
pub(crate) fn api_error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| fallback.to_string())
}

/// Build the user message carrying the rendered transcript
pub fn user_prompt(transcript_text: &str, prompt: &str) -> String {
    format!(
        "Here is a transcript with timestamps:\n\n{}\n\nBased on this prompt: \"{}\", identify the most relevant segments. For each segment, return the start time, end time, and text content. Focus on extracting insights that directly relate to the prompt.",
        transcript_text, prompt
    )
}

/// Chat completion client used by the segment extractor
pub struct OpenAiInsightAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiInsightAdapter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        })
    }
}

#[async_trait]
impl InsightPort for OpenAiInsightAdapter {
    async fn generate(&self, transcript_text: &str, prompt: &str) -> Result<String, DomainError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt(transcript_text, prompt),
                },
            ],
            temperature: self.temperature,
        };

        info!("Extracting insights with {}", self.model);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Extraction(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Extraction(api_error_message(
                &body,
                "Failed to extract insights",
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Extraction(format!("invalid response: {}", e)))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .unwrap_or_default();

        debug!("Insight response: {} chars", content.len());
        Ok(content)
    }
}
