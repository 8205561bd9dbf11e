use crate::{
    error::{AppError, Result},
    repositories::{
        Accomplishment, AccomplishmentCreateRequest, AccomplishmentRepository,
        PgAccomplishmentRepository,
    },
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::goal_service::validate_text_field;

const TITLE_MAX_LENGTH: usize = 200;
const TEXT_MAX_LENGTH: usize = 2000;

pub struct AccomplishmentService {
    accomplishment_repo: Arc<PgAccomplishmentRepository>,
}

impl AccomplishmentService {
    pub fn new(accomplishment_repo: Arc<PgAccomplishmentRepository>) -> Self {
        Self {
            accomplishment_repo,
        }
    }

    pub async fn create(&self, req: AccomplishmentCreateRequest) -> Result<Accomplishment> {
        validate_text_field("title", &req.title, TITLE_MAX_LENGTH)?;
        validate_text_field("description", &req.description, TEXT_MAX_LENGTH)?;
        validate_text_field("impact", &req.impact, TITLE_MAX_LENGTH)?;
        validate_text_field("category", &req.category, TITLE_MAX_LENGTH)?;

        let accomplishment = Accomplishment {
            accomplishment_id: Uuid::new_v4().to_string(),
            user_id: req.user_id,
            goal_id: req.goal_id.filter(|id| !id.trim().is_empty()),
            title: req.title,
            description: req.description,
            impact: req.impact,
            category: req.category,
            created_at: Utc::now(),
        };

        self.accomplishment_repo.create(accomplishment).await
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Accomplishment>> {
        self.accomplishment_repo.find_by_user_id(user_id).await
    }

    pub async fn find_by_goal(&self, goal_id: &str) -> Result<Vec<Accomplishment>> {
        self.accomplishment_repo.find_by_goal_id(goal_id).await
    }

    pub async fn delete(&self, accomplishment_id: &str) -> Result<()> {
        if !self.accomplishment_repo.delete(accomplishment_id).await? {
            return Err(AppError::NotFound(format!(
                "Accomplishment {} not found",
                accomplishment_id
            )));
        }
        Ok(())
    }
}
