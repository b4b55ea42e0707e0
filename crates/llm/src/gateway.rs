//! Chat-completions gateway
//!
//! Works with any OpenAI-compatible completion endpoint (Perplexity,
//! OpenAI, vLLM, local servers). The caller supplies a fully built
//! prompt; the gateway issues exactly one request and returns the first
//! choice's message content.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use shopchat_config::LlmSettings;

use crate::LlmError;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Endpoint base URL (without the /chat/completions suffix)
    pub endpoint: String,
    /// Model identifier
    pub model: String,
    /// Bearer token
    pub api_key: String,
    /// Token budget per completion
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout; the only bound on the single network call
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
    }
}

/// The external completion service as a black-box collaborator
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Produce the model's text completion for one prompt
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat-completions client
pub struct ChatCompletionsClient {
    config: GatewayConfig,
    client: Client,
}

impl ChatCompletionsClient {
    /// Create a new client
    ///
    /// An empty API key is rejected here as well as at settings
    /// validation, so a misassembled config can never send an empty
    /// bearer header.
    pub fn new(config: GatewayConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "API key required for the completion endpoint".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::HeaderValue;

        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", self.config.api_key);
        if let Ok(val) = HeaderValue::from_str(&auth_value) {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }

        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        headers
    }
}

#[async_trait]
impl CompletionGateway for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatRequestMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Requesting completion"
        );

        let response = self
            .client
            .post(self.chat_url())
            .headers(self.build_headers())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        Ok(choice.message.content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Wire types for the chat-completions contract

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(endpoint: &str) -> GatewayConfig {
        GatewayConfig {
            endpoint: endpoint.to_string(),
            model: "sonar-pro".to_string(),
            api_key: "pplx-test".to_string(),
            max_tokens: 1000,
            temperature: 1.0,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_rejects_empty_api_key() {
        let mut config = test_config("https://api.perplexity.ai");
        config.api_key = String::new();
        assert!(matches!(
            ChatCompletionsClient::new(config),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_chat_url() {
        let client = ChatCompletionsClient::new(test_config("https://api.perplexity.ai/")).unwrap();
        assert_eq!(
            client.chat_url(),
            "https://api.perplexity.ai/chat/completions"
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "sonar-pro".to_string(),
            messages: vec![ChatRequestMessage {
                role: "user".to_string(),
                content: "Do you have black tees".to_string(),
            }],
            max_tokens: 1000,
            temperature: 1.0,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "sonar-pro");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 1000);
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer pplx-test"))
            .and(body_partial_json(serde_json::json!({"model": "sonar-pro"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "We ship in 3-5 days." } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatCompletionsClient::new(test_config(&server.uri())).unwrap();
        let text = client.complete("where is my order").await.unwrap();
        assert_eq!(text, "We ship in 3-5 days.");
    }

    #[tokio::test]
    async fn test_non_success_status_carries_code() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = ChatCompletionsClient::new(test_config(&server.uri())).unwrap();
        match client.complete("hi").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected Api error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_missing_choices_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = ChatCompletionsClient::new(test_config(&server.uri())).unwrap();
        assert!(matches!(
            client.complete("hi").await,
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = ChatCompletionsClient::new(test_config(&server.uri())).unwrap();
        assert!(matches!(
            client.complete("hi").await,
            Err(LlmError::InvalidResponse(_))
        ));
    }
}
