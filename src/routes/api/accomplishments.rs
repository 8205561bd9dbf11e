use crate::{
    error::Result,
    repositories::{Accomplishment, AccomplishmentCreateRequest, AccomplishmentList},
    server::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::json;

pub fn create_accomplishment_routes() -> Router<AppState> {
    Router::new()
        .route("/accomplishments", post(create_accomplishment))
        .route(
            "/accomplishments/{accomplishment_id}",
            delete(delete_accomplishment),
        )
        .route("/accomplishments/list/{user_id}", get(list_by_user))
        .route("/accomplishments/goal/{goal_id}", get(list_by_goal))
}

async fn create_accomplishment(
    State(state): State<AppState>,
    Json(req): Json<AccomplishmentCreateRequest>,
) -> Result<Json<Accomplishment>> {
    let accomplishment = state.accomplishment_service.create(req).await?;
    Ok(Json(accomplishment))
}

async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AccomplishmentList>> {
    let accomplishments = state.accomplishment_service.find_by_user(&user_id).await?;
    Ok(Json(AccomplishmentList { accomplishments }))
}

async fn list_by_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
) -> Result<Json<AccomplishmentList>> {
    let accomplishments = state.accomplishment_service.find_by_goal(&goal_id).await?;
    Ok(Json(AccomplishmentList { accomplishments }))
}

async fn delete_accomplishment(
    State(state): State<AppState>,
    Path(accomplishment_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state
        .accomplishment_service
        .delete(&accomplishment_id)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Accomplishment deleted successfully"
    })))
}
