use crate::config::SlackConfig;
use crate::error::{AppError, Result};
use reqwest::Client;
use serde_json::json;

/// Incoming Webhook経由でSlackに通知を送るサービス
pub struct SlackService {
    client: Client,
    webhook_url: String,
}

impl SlackService {
    pub fn new(config: &SlackConfig) -> Self {
        Self {
            client: Client::new(),
            webhook_url: config.webhook_url.clone(),
        }
    }

    /// ユーザーからのフィードバックをSlackチャンネルに投稿する
    pub async fn notify_feedback(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        message: &str,
    ) -> Result<()> {
        if self.webhook_url.is_empty() {
            return Err(AppError::ConfigError(
                "SLACK_WEBHOOK_URL is not set".to_string(),
            ));
        }

        let sender = match (name, email) {
            (Some(name), Some(email)) => format!("{} ({})", name, email),
            (Some(name), None) => name.to_string(),
            (None, Some(email)) => email.to_string(),
            (None, None) => "Anonymous".to_string(),
        };
        let text = format!(":mailbox: New Wkly feedback from {}:\n>{}", sender, message);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Slack webhook request failed: {}", e);
                AppError::ExternalServiceError("Failed to deliver feedback.".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Slack webhook error: status={}, body={}", status, error_text);
            return Err(AppError::ExternalServiceError(
                "Failed to deliver feedback.".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_feedback_text_to_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/T000/B000/XXX"))
            .and(body_json(serde_json::json!({
                "text": ":mailbox: New Wkly feedback from Ada (ada@example.com):\n>Love the summaries"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let service = SlackService::new(&SlackConfig {
            webhook_url: format!("{}/services/T000/B000/XXX", server.uri()),
        });
        service
            .notify_feedback(Some("Ada"), Some("ada@example.com"), "Love the summaries")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn webhook_failure_is_opaque() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("channel_not_found"))
            .mount(&server)
            .await;

        let service = SlackService::new(&SlackConfig {
            webhook_url: server.uri(),
        });
        let error = service.notify_feedback(None, None, "hello").await.unwrap_err();
        let message = error.to_string();
        assert!(!message.contains("channel_not_found"));
    }

    #[tokio::test]
    async fn missing_webhook_url_fails_closed() {
        let service = SlackService::new(&SlackConfig {
            webhook_url: String::new(),
        });
        let error = service.notify_feedback(None, None, "hello").await.unwrap_err();
        assert!(matches!(error, AppError::ConfigError(_)));
    }
}
