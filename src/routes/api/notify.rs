use crate::{
    error::{AppError, Result},
    server::AppState,
};
use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use serde_json::json;

pub fn create_notify_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications/reminder", post(send_reminder))
        .route("/feedback", post(submit_feedback))
}

#[derive(Deserialize)]
struct ReminderRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    week_start: Option<String>,
}

/// 週次リマインダーメールの送信。スケジューラから週初めに呼ばれる想定。
async fn send_reminder(
    State(state): State<AppState>,
    Json(req): Json<ReminderRequest>,
) -> Result<Json<serde_json::Value>> {
    let email = req
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("email is required".to_string()))?;

    // 同一アドレスへの連続送信を抑止する
    state
        .reminder_limiter
        .check_email_limit(&email)
        .map_err(AppError::RateLimited)?;

    state
        .email_service
        .send_weekly_reminder(&email, req.display_name.as_deref(), req.week_start.as_deref())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Reminder sent successfully"
    })))
}

#[derive(Deserialize)]
struct FeedbackRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

async fn submit_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<serde_json::Value>> {
    let message = req
        .message
        .filter(|message| !message.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("message is required".to_string()))?;

    state
        .slack_service
        .notify_feedback(req.name.as_deref(), req.email.as_deref(), &message)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Feedback submitted successfully"
    })))
}
