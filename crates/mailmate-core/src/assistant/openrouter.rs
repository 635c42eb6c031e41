//! OpenAI-compatible chat completion client (OpenRouter by default).

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CompletionProvider;
use super::error::ProviderError;
use crate::config::CompletionConfig;
use crate::error::Result;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> std::result::Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("no completion in response".into()))
    }
}

/// Chat completion client speaking the `/chat/completions` protocol.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenRouterClient {
    /// Creates a client, reading the API key from the configured
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or the HTTP client cannot be
    /// built.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Creates a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_api_key(config: &CompletionConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    /// The model requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionProvider for OpenRouterClient {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        debug!("Requesting completion from {} ({} chars)", self.model, prompt.chars().count());

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if let Some(err) = ProviderError::from_status(response.status()) {
            return Err(err);
        }

        let body: ChatResponse = response.error_for_status()?.json().await?;
        body.into_content()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "openai/gpt-3.5-turbo",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "openai/gpt-3.5-turbo",
                "messages": [{ "role": "user", "content": "hi" }]
            })
        );
    }

    #[test]
    fn test_response_content() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_content().unwrap(), "Hello");
    }

    #[test]
    fn test_empty_choices_is_invalid() {
        let body: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            body.into_content(),
            Err(ProviderError::InvalidResponse(_))
        ));

        let body: ChatResponse = serde_json::from_str(r#"{"error":{"message":"nope"}}"#).unwrap();
        assert!(body.into_content().is_err());
    }

    #[test]
    fn test_endpoint_from_base_url() {
        let config = CompletionConfig {
            base_url: "https://example.test/api/v1/".into(),
            ..CompletionConfig::default()
        };
        let client = OpenRouterClient::with_api_key(&config, "key").unwrap();
        assert_eq!(client.endpoint, "https://example.test/api/v1/chat/completions");
        assert_eq!(client.model(), "openai/gpt-3.5-turbo");
    }
}
