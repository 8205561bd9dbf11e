use crate::config::EmailConfig;
use crate::error::{AppError, Result};
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};

#[derive(Debug)]
pub struct EmailService {
    smtp_transport: SmtpTransport,
    from_email: String,
    from_name: String,
}

impl EmailService {
    /// Configから初期化
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        if config.smtp_host.is_empty() {
            return Err(AppError::ConfigError("SMTP_HOST is not set".to_string()));
        }

        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let smtp_transport = SmtpTransport::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::ConfigError(format!("SMTP接続エラー: {}", e)))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            smtp_transport,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }

    /// 週次リマインダーメールを送信
    pub async fn send_weekly_reminder(
        &self,
        to_email: &str,
        display_name: Option<&str>,
        week_start: Option<&str>,
    ) -> Result<()> {
        let greeting = match display_name {
            Some(name) if !name.trim().is_empty() => format!("Hi {},", name.trim()),
            _ => "Hi,".to_string(),
        };
        let week_line = match week_start {
            Some(week) if !week.trim().is_empty() => {
                format!("Your week starting {} is ready for planning.", week.trim())
            }
            _ => "A new week is ready for planning.".to_string(),
        };

        let subject = "Wkly: Time to set your weekly goals";
        let body = format!(
            r#"
{}

{}

Take a few minutes to set your goals for the week and log last week's
accomplishments. Small, consistent check-ins make the end-of-week summary
much more useful.

---
Wkly
"#,
            greeting, week_line
        );

        self.send_email(to_email, subject, &body).await
    }

    /// メール送信（内部メソッド）
    async fn send_email(&self, to_email: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.from_name, self.from_email)
                    .parse()
                    .map_err(|e| {
                        AppError::ValidationError(format!("送信元アドレスが無効: {}", e))
                    })?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::ValidationError(format!("送信先アドレスが無効: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::ValidationError(format!("メール作成エラー: {}", e)))?;

        // ブロッキングなSMTP送信を別スレッドで実行
        let transport = self.smtp_transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| {
                tracing::error!("email send task failed: {}", e);
                AppError::ExternalServiceError("Failed to send reminder email.".to_string())
            })?
            .map_err(|e| {
                tracing::error!("SMTP send failed: {}", e);
                AppError::ExternalServiceError("Failed to send reminder email.".to_string())
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_email_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "user".to_string(),
            smtp_password: "pass".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Wkly".to_string(),
        }
    }

    #[test]
    fn builds_transport_from_config() {
        assert!(EmailService::from_config(&test_email_config()).is_ok());
    }

    #[test]
    fn empty_smtp_host_fails_closed() {
        let mut config = test_email_config();
        config.smtp_host = String::new();
        let error = EmailService::from_config(&config).unwrap_err();
        assert!(matches!(error, AppError::ConfigError(_)));
    }

    #[tokio::test]
    async fn invalid_recipient_is_rejected_before_sending() {
        let service = EmailService::from_config(&test_email_config()).unwrap();
        let error = service
            .send_weekly_reminder("not-an-address", None, None)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::ValidationError(_)));
    }
}
