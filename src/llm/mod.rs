//! Anthropic Messages API call wrapper.
//!
//! One [`ModelClient`] is constructed at startup and shared read-only by
//! every concurrent relevance call; it issues independent request/response
//! pairs with no session state. The retry policy is fixed: three attempts
//! with 2s then 4s backoff, after which the call silently yields `None` —
//! callers treat an absent result as "no analysis available" and continue.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::sleep;

/// The default Anthropic API base URL.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// The required Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model used for relevance analysis unless configured otherwise.
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";

/// Response token bound for relevance analysis.
pub const DEFAULT_MAX_TOKENS: u32 = 8000;

/// Client-level request timeout.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(100);

/// Fixed attempt count; never configurable.
const MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay between attempts.
const BACKOFF_BASE: Duration = Duration::from_secs(2);

/// Backoff before retrying after failed attempt `attempt` (0-based):
/// `base * 2^attempt`, i.e. 2s then 4s with the default base.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.saturating_pow(attempt)
}

/// One role-tagged message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A prompt: either a bare string (wrapped as a single user message) or a
/// pre-built message list.
#[derive(Debug, Clone)]
pub enum Prompt {
    Text(String),
    Messages(Vec<ChatMessage>),
}

impl Prompt {
    fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            Prompt::Text(text) => vec![ChatMessage::user(text)],
            Prompt::Messages(messages) => messages,
        }
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<Vec<ChatMessage>> for Prompt {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Prompt::Messages(messages)
    }
}

/// Errors inside one attempt. Never surfaces to callers of [`ModelClient::call`];
/// exhausted retries yield `None`.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Shared Anthropic Messages API client.
#[derive(Debug, Clone)]
pub struct ModelClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    backoff_base: Duration,
}

impl ModelClient {
    /// Create a client with the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(|e| ModelError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            backoff_base: BACKOFF_BASE,
        })
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the response token bound.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the endpoint (for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the backoff base (for testing; keeps the schedule shape).
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Send a prompt and return the response text.
    ///
    /// Up to [`MAX_ATTEMPTS`] attempts with [`backoff_delay`] sleeps in
    /// between; returns `None` after the final failure instead of an error.
    pub async fn call(&self, prompt: impl Into<Prompt>) -> Option<String> {
        let messages = prompt.into().into_messages();

        for attempt in 0..MAX_ATTEMPTS {
            match self.attempt(&messages).await {
                Ok(text) => return Some(text),
                Err(err) => {
                    tracing::warn!("model call attempt {} failed: {err}", attempt + 1);
                    if attempt + 1 < MAX_ATTEMPTS {
                        let delay = backoff_delay(self.backoff_base, attempt);
                        tracing::debug!("retrying model call in {:?}", delay);
                        sleep(delay).await;
                    } else {
                        tracing::warn!("model call failed after {MAX_ATTEMPTS} attempts");
                    }
                }
            }
        }

        None
    }

    async fn attempt(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let url = format!("{}/messages", self.base_url);
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": messages,
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModelError::Api(format!(
                "model endpoint returned status: {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        body.get("content")
            .and_then(Value::as_array)
            .and_then(|blocks| blocks.first())
            .and_then(|block| block.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ModelError::Parse("response carried no text content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_schedule_is_two_then_four_seconds() {
        let base = Duration::from_secs(2);
        assert_eq!(backoff_delay(base, 0), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(4));
    }

    #[test]
    fn string_prompt_becomes_single_user_message() {
        let messages = Prompt::from("rank these trials").into_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "rank these trials");
    }

    #[test]
    fn message_list_prompt_passes_through() {
        let prompt = Prompt::from(vec![
            ChatMessage::user("first"),
            ChatMessage {
                role: "assistant".to_string(),
                content: "second".to_string(),
            },
        ]);
        let messages = prompt.into_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, "assistant");
    }
}
