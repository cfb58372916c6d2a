//! Gemini completion client
//!
//! Talks to the generateContent / streamGenerateContent endpoints
//! directly over reqwest. The streaming path consumes the SSE response
//! line by line and forwards text deltas through an mpsc channel.

use futures::StreamExt;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{CompletionRequest, Provider, ProviderError, StreamEvent};
use crate::config::Config;

const SYSTEM_INSTRUCTION: &str = "You are an experienced software engineering mentor. \
Give practical, encouraging advice with concrete examples. \
Keep answers focused and format them as markdown.";

/// Gemini client for the mentor relay
pub struct GeminiClient {
    client: HttpClient,
    api_key: String,
    api_base: String,
    model: String,
    max_output_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String, config: &Config) -> Self {
        Self {
            client: HttpClient::new(),
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.provider_timeout_secs),
        }
    }

    /// Create from config. The key check happens here, eagerly, before
    /// any network call.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or(ProviderError::MissingApiKey)?;
        Ok(Self::new(api_key, config))
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        )
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/{}:streamGenerateContent?alt=sse&key={}",
            self.api_base, self.model, self.api_key
        )
    }

    /// Flatten the conversation into a single prompt: system instruction,
    /// context label, serialized history (oldest first), new message.
    fn build_prompt(request: &CompletionRequest) -> String {
        let mut prompt = String::new();
        prompt.push_str(SYSTEM_INSTRUCTION);
        prompt.push_str("\n\nContext: ");
        prompt.push_str(&request.context);
        prompt.push_str("\n\n");

        for msg in &request.history {
            let speaker = match msg.role {
                super::MessageRole::User => "Human",
                super::MessageRole::Assistant => "Assistant",
            };
            prompt.push_str(speaker);
            prompt.push_str(": ");
            prompt.push_str(&msg.content);
            prompt.push('\n');
        }

        prompt.push_str("\nHuman: ");
        prompt.push_str(&request.message);
        prompt.push_str("\nAssistant:");
        prompt
    }

    fn build_request(&self, request: &CompletionRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: Self::build_prompt(request),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait::async_trait]
impl Provider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let api_request = self.build_request(request);

        tracing::debug!(
            model = %self.model,
            prompt_chars = api_request.contents[0].parts[0].text.len(),
            "Gemini generateContent"
        );

        let response = self
            .client
            .post(self.generate_url())
            .json(&api_request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let api_response: GeminiResponse = response.json().await?;

        if let Some(error) = api_response.error {
            return Err(ProviderError::Api {
                status: error.code.unwrap_or(0),
                body: error.message,
            });
        }

        let text = api_response.text();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }

    async fn stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>, ProviderError> {
        let (tx, rx) = mpsc::channel(100);

        let api_request = self.build_request(request);
        let url = self.stream_url();
        let client = self.client.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            match client
                .post(&url)
                .json(&api_request)
                .timeout(timeout)
                .send()
                .await
            {
                Ok(response) => {
                    if !response.status().is_success() {
                        let status = response.status();
                        let body = response.text().await.unwrap_or_default();
                        let _ = tx
                            .send(StreamEvent::Error(format!(
                                "Gemini API error: {} - {}",
                                status, body
                            )))
                            .await;
                        return;
                    }

                    let mut stream = response.bytes_stream();
                    let mut buffer = String::new();

                    while let Some(chunk) = stream.next().await {
                        match chunk {
                            Ok(bytes) => {
                                buffer.push_str(&String::from_utf8_lossy(&bytes));

                                // Parse SSE events
                                while let Some(line_end) = buffer.find('\n') {
                                    let line = buffer[..line_end].to_string();
                                    buffer = buffer[line_end + 1..].to_string();

                                    if let Some(data) = line.strip_prefix("data: ") {
                                        if let Ok(response) =
                                            serde_json::from_str::<GeminiResponse>(data)
                                        {
                                            let text = response.text();
                                            if !text.is_empty()
                                                && tx
                                                    .send(StreamEvent::TextDelta(text))
                                                    .await
                                                    .is_err()
                                            {
                                                // Consumer hung up
                                                return;
                                            }
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                                return;
                            }
                        }
                    }

                    let _ = tx.send(StreamEvent::Done).await;
                }
                Err(e) => {
                    let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                }
            }
        });

        Ok(rx)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate, empty when absent.
    fn text(&self) -> String {
        let mut text = String::new();
        if let Some(candidates) = &self.candidates {
            if let Some(candidate) = candidates.first() {
                for part in &candidate.content.parts {
                    if let Some(t) = &part.text {
                        text.push_str(t);
                    }
                }
            }
        }
        text
    }
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    code: Option<u16>,
    message: String,
}
