use crate::{
    error::{AppError, Result},
    repositories::{Goal, GoalCreateRequest, GoalRepository, GoalUpdateRequest, PgGoalRepository},
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

const TITLE_MAX_LENGTH: usize = 200;
const TEXT_MAX_LENGTH: usize = 2000;

pub struct GoalService {
    goal_repo: Arc<PgGoalRepository>,
}

impl GoalService {
    pub fn new(goal_repo: Arc<PgGoalRepository>) -> Self {
        Self { goal_repo }
    }

    pub async fn find_by_user(
        &self,
        user_id: &str,
        week_start: Option<NaiveDate>,
    ) -> Result<Vec<Goal>> {
        self.goal_repo.find_by_user_id(user_id, week_start).await
    }

    pub async fn find_by_id(&self, goal_id: &str) -> Result<Goal> {
        self.goal_repo
            .find_by_id(goal_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Goal {} not found", goal_id)))
    }

    pub async fn create(&self, req: GoalCreateRequest) -> Result<Goal> {
        // タイトル・説明・カテゴリは作成時に必須
        validate_text_field("title", &req.title, TITLE_MAX_LENGTH)?;
        validate_text_field("description", &req.description, TEXT_MAX_LENGTH)?;
        validate_text_field("category", &req.category, TITLE_MAX_LENGTH)?;

        let now = Utc::now();
        let status_set_at = req.status.as_ref().map(|_| now);
        let goal = Goal {
            goal_id: Uuid::new_v4().to_string(),
            user_id: req.user_id,
            title: req.title,
            description: req.description,
            category: req.category,
            week_start: req.week_start,
            status: req.status,
            status_notes: req.status_notes,
            status_set_at,
            created_at: now,
        };

        self.goal_repo.create(goal).await
    }

    pub async fn update(&self, goal_id: &str, req: GoalUpdateRequest) -> Result<Goal> {
        if let Some(ref title) = req.title {
            validate_text_field("title", title, TITLE_MAX_LENGTH)?;
        }
        if let Some(ref description) = req.description {
            validate_text_field("description", description, TEXT_MAX_LENGTH)?;
        }
        if let Some(ref category) = req.category {
            validate_text_field("category", category, TITLE_MAX_LENGTH)?;
        }

        // ステータスが変更される場合は設定日時を記録する
        let status_set_at = req.status.as_ref().map(|_| Utc::now());

        self.goal_repo
            .update(goal_id, &req, status_set_at)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Goal {} not found", goal_id)))
    }

    pub async fn delete(&self, goal_id: &str) -> Result<()> {
        if !self.goal_repo.delete(goal_id).await? {
            return Err(AppError::NotFound(format!("Goal {} not found", goal_id)));
        }
        Ok(())
    }
}

pub(crate) fn validate_text_field(field: &str, value: &str, maximum_length: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!(
            "{} cannot be empty",
            field
        )));
    }
    if value.len() > maximum_length {
        return Err(AppError::ValidationError(format!(
            "{} cannot exceed {} characters",
            field, maximum_length
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_values() {
        let error = validate_text_field("title", "   ", 100).unwrap_err();
        assert!(error.to_string().contains("title cannot be empty"));
    }

    #[test]
    fn rejects_oversized_values() {
        let long = "a".repeat(101);
        let error = validate_text_field("description", &long, 100).unwrap_err();
        assert!(error.to_string().contains("cannot exceed 100 characters"));
    }

    #[test]
    fn accepts_reasonable_values() {
        assert!(validate_text_field("category", "Technical skills", 100).is_ok());
    }
}
