use axum::{
    http::{header, Method},
    Router,
};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;
use crate::routes::create_api_routes;
use crate::services::{
    AccomplishmentService, EmailService, GoalService, ReminderRateLimiter, SlackService,
    SummaryService,
};

/// アプリケーション全体で共有される状態
#[derive(Clone)]
pub struct AppState {
    // DB
    pub pg_pool: PgPool,
    /// サービス層
    pub goal_service: Arc<GoalService>,
    pub accomplishment_service: Arc<AccomplishmentService>,
    pub summary_service: Arc<SummaryService>,
    pub email_service: Arc<EmailService>,
    pub slack_service: Arc<SlackService>,
    pub reminder_limiter: Arc<ReminderRateLimiter>,
    /// アプリケーション設定
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new().nest("/api", create_api_routes()).with_state(state)
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    tracing::info!("Starting Wkly Server...");

    let allowed_origins = state.config.server.get_allowed_origins(&addr)?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(vec![header::CONTENT_TYPE]);

    let app = create_app(state).layer(cors);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server is running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
