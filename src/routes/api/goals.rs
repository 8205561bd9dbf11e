use crate::{
    error::Result,
    repositories::{Goal, GoalCreateRequest, GoalList, GoalUpdateRequest},
    server::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

pub fn create_goal_routes() -> Router<AppState> {
    Router::new()
        .route("/goals", post(create_goal))
        .route(
            "/goals/{goal_id}",
            get(get_goal).patch(update_goal).delete(delete_goal),
        )
        .route("/goals/list/{user_id}", get(list_goals))
}

async fn create_goal(
    State(state): State<AppState>,
    Json(req): Json<GoalCreateRequest>,
) -> Result<Json<Goal>> {
    let goal = state.goal_service.create(req).await?;
    Ok(Json(goal))
}

async fn get_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
) -> Result<Json<Goal>> {
    let goal = state.goal_service.find_by_id(&goal_id).await?;
    Ok(Json(goal))
}

#[derive(Deserialize)]
struct ListGoalsQuery {
    week_start: Option<NaiveDate>,
}

async fn list_goals(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListGoalsQuery>,
) -> Result<Json<GoalList>> {
    let goals = state
        .goal_service
        .find_by_user(&user_id, query.week_start)
        .await?;
    Ok(Json(GoalList { goals }))
}

async fn update_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
    Json(req): Json<GoalUpdateRequest>,
) -> Result<Json<Goal>> {
    let goal = state.goal_service.update(&goal_id, req).await?;
    Ok(Json(goal))
}

async fn delete_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.goal_service.delete(&goal_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Goal deleted successfully"
    })))
}
