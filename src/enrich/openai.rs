//! OpenAI chat-completions client for TL;DR generation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Summarizer;
use crate::{MuninnError, Result};

/// Default base URL for the OpenAI API
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default summarization model
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that creates concise TL;DR summaries \
     of Reddit posts. Keep your summary to 4 sentences.";

/// Body text beyond this many characters is truncated before prompting.
const MAX_BODY_CHARS: usize = 6000;

/// Summarizer backed by the OpenAI chat-completions API.
#[derive(Clone)]
pub struct OpenAiSummarizer {
    api_key: String,
    model: String,
    http: Client,
    base_url: String,
}

impl OpenAiSummarizer {
    /// Create a new summarizer with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a summarizer with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            http,
            base_url: base_url.into(),
        }
    }

    /// Override the summarization model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generate a TL;DR for one post.
    ///
    /// Empty content short-circuits without an API call. Long bodies are
    /// truncated to [`MAX_BODY_CHARS`] characters before prompting, and
    /// a "TL;DR:" prefix in the reply is stripped.
    pub async fn generate_tldr(&self, title: &str, body: &str) -> Result<String> {
        if body.trim().is_empty() {
            return Ok("No content to summarize.".to_string());
        }

        let body = truncate_chars(body, MAX_BODY_CHARS);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Title: {title}\n\nContent: {body}\n\nWrite a TL;DR:"),
                },
            ],
            max_tokens: 500,
            temperature: 0.4,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        handle_response_errors(&response)?;

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(MuninnError::EmptyResponse)?;

        Ok(strip_tldr_prefix(content.trim()).to_string())
    }
}

/// Check response status and map to the appropriate error.
fn handle_response_errors(response: &reqwest::Response) -> Result<()> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    match status.as_u16() {
        401 | 403 => Err(MuninnError::AuthenticationFailed),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(MuninnError::RateLimited { retry_after })
        }
        code => Err(MuninnError::Upstream {
            status: code,
            message: format!("OpenAI API error: {}", status),
        }),
    }
}

/// Truncate to at most `max` characters, appending an ellipsis.
///
/// Counts characters, not bytes, so multi-byte text never splits mid
/// character.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max).collect();
    truncated.push_str("...");
    truncated
}

/// Drop a leading "TL;DR:" the model sometimes includes anyway.
fn strip_tldr_prefix(summary: &str) -> &str {
    match summary.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("tl;dr:") => summary[6..].trim_start(),
        _ => summary,
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, title: &str, body: &str) -> Result<String> {
        self.generate_tldr(title, body).await
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
