use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod repositories;
mod routes;
mod server;
mod services;

use config::Config;
use repositories::{PgAccomplishmentRepository, PgGoalRepository, PgSummaryRepository};
use server::AppState;
use services::{
    AccomplishmentService, EmailService, GoalService, OpenAiClient, ProviderPacer,
    ReminderRateLimiter, SlackService, SummaryService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // DB接続
    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.connection_url)
        .await?;

    // リポジトリ層
    let goal_repo = Arc::new(PgGoalRepository::new(pg_pool.clone()));
    let accomplishment_repo = Arc::new(PgAccomplishmentRepository::new(pg_pool.clone()));
    let summary_repo = Arc::new(PgSummaryRepository::new(pg_pool.clone()));

    // サービス層。ペーサーはプロセスで1つだけ生成して参照共有する
    let pacer = Arc::new(ProviderPacer::new(Duration::from_millis(
        config.openai.min_interval_ms,
    )));
    let openai = Arc::new(OpenAiClient::new(&config.openai));

    let email_service = Arc::new(EmailService::from_config(&config.email)?);

    let state = AppState {
        pg_pool,
        goal_service: Arc::new(GoalService::new(goal_repo)),
        accomplishment_service: Arc::new(AccomplishmentService::new(accomplishment_repo)),
        summary_service: Arc::new(SummaryService::new(summary_repo, openai, pacer)),
        email_service,
        slack_service: Arc::new(SlackService::new(&config.slack)),
        reminder_limiter: Arc::new(ReminderRateLimiter::new()),
        config: Arc::new(config),
    };

    server::start_server(addr, state).await
}
