use crate::{
    error::Result,
    repositories::{Scope, Summary, SummaryCreateRequest, SummaryList, SummaryUpdateRequest},
    server::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

pub fn create_summary_routes() -> Router<AppState> {
    Router::new()
        .route("/summaries", post(create_summary))
        .route(
            "/summaries/{summary_id}",
            patch(update_summary).delete(delete_summary),
        )
        .route("/summaries/list/{user_id}", get(list_summaries))
        .route("/summaries/current/{user_id}", get(get_current_summary))
}

async fn create_summary(
    State(state): State<AppState>,
    Json(req): Json<SummaryCreateRequest>,
) -> Result<Json<Summary>> {
    let summary = state.summary_service.create(req).await?;
    Ok(Json(summary))
}

async fn update_summary(
    State(state): State<AppState>,
    Path(summary_id): Path<String>,
    Json(req): Json<SummaryUpdateRequest>,
) -> Result<Json<Summary>> {
    let summary = state
        .summary_service
        .update_content(&summary_id, &req.summary_text)
        .await?;
    Ok(Json(summary))
}

async fn delete_summary(
    State(state): State<AppState>,
    Path(summary_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.summary_service.delete(&summary_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Summary deleted successfully"
    })))
}

async fn list_summaries(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SummaryList>> {
    let summaries = state.summary_service.find_by_user(&user_id).await?;
    Ok(Json(SummaryList { summaries }))
}

#[derive(Deserialize)]
struct CurrentSummaryQuery {
    scope: Scope,
    week_start: NaiveDate,
}

/// (scope, 期間開始日)に対応する現在の要約を返す。
/// クライアントはこの結果で作成/更新のどちらを行うかを決める。
async fn get_current_summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<CurrentSummaryQuery>,
) -> Result<Json<Option<Summary>>> {
    let summary = state
        .summary_service
        .find_by_period(&user_id, query.scope, query.week_start)
        .await?;
    Ok(Json(summary))
}
