use axum::Router;

use crate::server::AppState;

mod accomplishments;
mod goals;
mod notify;
mod summaries;
pub mod summarize;

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .merge(goals::create_goal_routes())
        .merge(accomplishments::create_accomplishment_routes())
        .merge(summaries::create_summary_routes())
        .merge(summarize::create_summarize_routes())
        .merge(notify::create_notify_routes())
}
