use anyhow::Context;
use axum::http::HeaderValue;
use serde::Deserialize;
use std::env;
use std::fs;
use std::str::FromStr;

/// 実行環境を表すenum
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(anyhow::anyhow!("Invalid environment: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Environment::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub openai: OpenAiConfig,
    pub email: EmailConfig,
    pub slack: SlackConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub connection_url: String,
    pub db_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub env: Environment,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// 環境に応じたallowed_originsをHeaderValueとして取得
    ///
    /// # Errors
    /// プロダクション環境でallowed_originsが設定されていない場合にエラーを返す
    pub fn get_allowed_origins(
        &self,
        addr: &std::net::SocketAddr,
    ) -> anyhow::Result<Vec<HeaderValue>> {
        let origin_strings = match self.env {
            Environment::Production => {
                // プロダクション環境: 明示的に指定されたオリジンのみ
                if !self.allowed_origins.is_empty() {
                    self.allowed_origins.clone()
                } else {
                    anyhow::bail!(
                        "Production environment requires explicit ALLOWED_ORIGINS configuration. \
                        Set ALLOWED_ORIGINS environment variable"
                    );
                }
            }
            Environment::Development => {
                // 開発環境: ローカルホスト関連のオリジンを許可
                let mut origins = vec![
                    format!("http://localhost:{}", addr.port()),
                    format!("http://127.0.0.1:{}", addr.port()),
                    "http://localhost:3000".to_string(),
                    format!("http://{}", addr),
                ];

                origins.extend(self.allowed_origins.clone());
                origins
            }
        };

        // String から HeaderValue に変換し、失敗したものはログ出力してスキップ
        let headers: Vec<HeaderValue> = origin_strings
            .into_iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(header_value) => {
                    tracing::info!("Allowed origin: {}", origin);
                    Some(header_value)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse origin '{}': {}", origin, e);
                    None
                }
            })
            .collect();

        if headers.is_empty() {
            anyhow::bail!("No valid CORS origins configured");
        }

        Ok(headers)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    /// 空の場合は起動時ではなく最初の利用時にエラーになる
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// プロバイダ呼び出し間の最小間隔（ミリ秒）
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_min_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlackConfig {
    /// Incoming Webhook URL。空の場合は最初の利用時にエラーになる
    #[serde(default)]
    pub webhook_url: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // 環境変数から読み込む場合
        if let Ok(database_url) = env::var("DATABASE_URL") {
            return Ok(Config {
                database: DatabaseConfig {
                    connection_url: database_url,
                    db_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "wkly_db".to_string()),
                },
                server: ServerConfig {
                    host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                    port: env::var("SERVER_PORT")
                        .unwrap_or_else(|_| "5050".to_string())
                        .parse()
                        .unwrap_or(5050),
                    env: env::var("ENVIRONMENT")
                        .ok()
                        .and_then(|s| Environment::from_str(&s).ok())
                        .unwrap_or(Environment::Development),
                    allowed_origins: env::var("ALLOWED_ORIGINS")
                        .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                        .unwrap_or_else(|_| Vec::new()),
                },
                logging: LoggingConfig {
                    level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                },
                openai: OpenAiConfig {
                    api_key: env::var("OPENAI_API_KEY").unwrap_or_else(|_| String::new()),
                    model: env::var("OPENAI_MODEL").unwrap_or_else(|_| default_openai_model()),
                    base_url: env::var("OPENAI_BASE_URL")
                        .unwrap_or_else(|_| default_openai_base_url()),
                    min_interval_ms: env::var("OPENAI_MIN_INTERVAL_MS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(default_min_interval_ms),
                },
                email: EmailConfig {
                    smtp_host: env::var("SMTP_HOST")
                        .context("SMTP_HOST must be set when using env vars")?,
                    smtp_port: env::var("SMTP_PORT")
                        .unwrap_or_else(|_| "587".to_string())
                        .parse()
                        .context("Invalid SMTP_PORT")?,
                    smtp_username: env::var("SMTP_USERNAME")
                        .context("SMTP_USERNAME must be set when using env vars")?,
                    smtp_password: env::var("SMTP_PASSWORD")
                        .context("SMTP_PASSWORD must be set when using env vars")?,
                    from_email: env::var("SMTP_FROM_EMAIL")
                        .unwrap_or_else(|_| env::var("SMTP_USERNAME").unwrap_or_default()),
                    from_name: env::var("SMTP_FROM_NAME")
                        .unwrap_or_else(|_| "Wkly".to_string()),
                },
                slack: SlackConfig {
                    webhook_url: env::var("SLACK_WEBHOOK_URL").unwrap_or_else(|_| String::new()),
                },
            });
        }

        // Config.tomlから読み込む場合（ローカル開発）
        let config_str = fs::read_to_string("Config.toml").context(
            "Failed to read Config.toml. Use environment variables or provide Config.toml",
        )?;

        let mut config: Config =
            toml::from_str(&config_str).context("Failed to parse Config.toml")?;

        // 環境変数があれば優先する
        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            config.openai.api_key = api_key;
        }
        if let Ok(model) = env::var("OPENAI_MODEL") {
            config.openai.model = model;
        }
        if let Ok(username) = env::var("SMTP_USERNAME") {
            config.email.smtp_username = username;
        }
        if let Ok(password) = env::var("SMTP_PASSWORD") {
            config.email.smtp_password = password;
        }
        if let Ok(webhook_url) = env::var("SLACK_WEBHOOK_URL") {
            config.slack.webhook_url = webhook_url;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config_toml() {
        let toml_str = r#"
            [database]
            connection_url = "postgres://localhost/wkly"
            db_name = "wkly_db"

            [server]
            host = "127.0.0.1"
            port = 5050
            env = "development"

            [logging]
            level = "debug"

            [openai]
            api_key = "sk-test"
            model = "gpt-4o-mini"
            min_interval_ms = 500

            [email]
            smtp_host = "smtp.example.com"
            smtp_port = 587
            smtp_username = "user"
            smtp_password = "pass"
            from_email = "noreply@example.com"
            from_name = "Wkly"

            [slack]
            webhook_url = "https://hooks.slack.com/services/T000/B000/XXX"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.server.env, Environment::Development);
        assert_eq!(config.openai.min_interval_ms, 500);
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn openai_section_defaults_apply() {
        let toml_str = r#"
            [database]
            connection_url = "postgres://localhost/wkly"
            db_name = "wkly_db"

            [server]
            host = "127.0.0.1"
            port = 5050

            [logging]
            level = "info"

            [openai]

            [email]
            smtp_host = "smtp.example.com"
            smtp_port = 587
            smtp_username = "user"
            smtp_password = "pass"
            from_email = "noreply@example.com"
            from_name = "Wkly"

            [slack]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.openai.api_key.is_empty());
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.min_interval_ms, 1000);
        assert!(config.slack.webhook_url.is_empty());
    }
}
