use std::env;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::types::{ApiError, ChatRequest, ChatResponse, ErrorEnvelope, Message};

const API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "gemma2-9b-it";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("GROQ_API_KEY not set. Get one at https://console.groq.com/keys")]
    ApiKeyNotSet,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API key rejected: {0}")]
    Unauthorized(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("model returned an empty answer")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction over a chat-completion backend.
/// Implemented by `GroqClient` for production; mock implementations used in tests.
pub trait ChatModel {
    fn model(&self) -> &str;
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Groq's OpenAI-compatible chat-completions API.
///
/// Configuration via environment variables:
/// - `GROQ_API_KEY`: required
/// - `GROQ_MODEL`: model id (default `gemma2-9b-it`)
/// - `GROQ_BASE_URL`: API root (default `https://api.groq.com/openai/v1`)
#[derive(Clone, Debug)]
pub struct GroqClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl GroqClient {
    pub fn from_env(http: Client) -> Result<Self, LlmError> {
        Self::from_lookup(http, |name| env::var(name).ok())
    }

    fn from_lookup(http: Client, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = non_empty("GROQ_API_KEY").ok_or(LlmError::ApiKeyNotSet)?;
        let model = non_empty("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = non_empty("GROQ_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| API_BASE.to_string());

        Ok(Self {
            http,
            api_key: ApiKey(api_key),
            model,
            base_url,
        })
    }

    /// Override the model chosen from the environment.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

impl ChatModel for GroqClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let api_error = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .map(|e| e.error);
            let classified = classify_status(status, api_error.as_ref(), &text);
            warn!(status = %status, error = %classified, "chat completion failed");
            return Err(classified);
        }

        let body: ChatResponse = response.json().await?;
        if let Some(err) = &body.error {
            let classified = classify_status(status, Some(err), "");
            warn!(error = %classified, "chat completion error in 200 response");
            return Err(classified);
        }

        let answer = body
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        debug!(model = %self.model, chars = answer.len(), "chat completion complete");
        Ok(answer)
    }
}

fn classify_status(status: StatusCode, err: Option<&ApiError>, raw_body: &str) -> LlmError {
    let message = err
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| {
            let snippet = crate::text::truncate_chars(raw_body, 200);
            if snippet.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {snippet}")
            }
        });

    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized(message),
        _ if err.and_then(|e| e.kind.as_deref()) == Some("rate_limit_exceeded") => {
            LlmError::RateLimited
        }
        _ => LlmError::Api {
            code: status.as_u16(),
            message,
        },
    }
}
