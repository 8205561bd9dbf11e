use crate::config::OpenAiConfig;
use crate::error::{AppError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 要約1件あたりのトークン上限（約480文字の要約に十分な量）
const MAX_COMPLETION_TOKENS: u32 = 220;
const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 1.0;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// プロバイダが本文を返さなかった場合のフォールバック文字列
pub const NO_SUMMARY_FALLBACK: &str = "No summary available.";

/// OpenAI chat-completion APIのラッパー。
/// パラメータは固定、ストリーミングなし、候補数は常に1。
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    n: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// プロンプト1件を送信し、最初の候補のテキストを返す。
    /// プロバイダ側の失敗は詳細をログにのみ残し、呼び出し元には汎用エラーを返す。
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(AppError::ConfigError("OPENAI_API_KEY is not set".to_string()));
        }

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            n: 1,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI API request failed: {}", e);
                AppError::ExternalServiceError("Failed to generate summary.".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI API error: status={}, body={}", status, error_text);
            return Err(AppError::ExternalServiceError(
                "Failed to generate summary.".to_string(),
            ));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}", e);
            AppError::ExternalServiceError("Failed to generate summary.".to_string())
        })?;

        let summary = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_SUMMARY_FALLBACK.to_string());

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str, api_key: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: api_key.to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: base_url.to_string(),
            min_interval_ms: 1000,
        }
    }

    #[tokio::test]
    async fn returns_trimmed_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "  A productive week.  " } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(&server.uri(), "sk-test"));
        let summary = client.complete("prompt").await.unwrap();
        assert_eq!(summary, "A productive week.");
    }

    #[tokio::test]
    async fn empty_response_falls_back_to_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(&server.uri(), "sk-test"));
        let summary = client.complete("prompt").await.unwrap();
        assert_eq!(summary, NO_SUMMARY_FALLBACK);
    }

    #[tokio::test]
    async fn provider_error_is_surfaced_as_opaque_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_string("{\"error\": \"insufficient_quota for org-12345\"}"),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(&server.uri(), "sk-test"));
        let error = client.complete("prompt").await.unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Failed to generate summary."));
        // プロバイダ側の詳細は呼び出し元に渡さない
        assert!(!message.contains("insufficient_quota"));
        assert!(!message.contains("org-12345"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(&server.uri(), ""));
        let error = client.complete("prompt").await.unwrap_err();
        assert!(matches!(error, AppError::ConfigError(_)));
    }
}
