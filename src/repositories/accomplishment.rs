use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// 達成事項。作成後は削除以外の変更を行わない
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Accomplishment {
    pub accomplishment_id: String,
    pub user_id: String,
    /// 任意の目標への逆参照（所有関係ではない）
    pub goal_id: Option<String>,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct AccomplishmentList {
    pub accomplishments: Vec<Accomplishment>,
}

#[derive(Debug, Deserialize)]
pub struct AccomplishmentCreateRequest {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub category: String,
    #[serde(default)]
    pub goal_id: Option<String>,
}

const ACCOMPLISHMENT_COLUMNS: &str =
    "accomplishment_id, user_id, goal_id, title, description, impact, category, created_at";

#[async_trait]
pub trait AccomplishmentRepository: Send + Sync {
    async fn create(&self, accomplishment: Accomplishment) -> Result<Accomplishment>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Accomplishment>>;
    async fn find_by_goal_id(&self, goal_id: &str) -> Result<Vec<Accomplishment>>;
    async fn delete(&self, accomplishment_id: &str) -> Result<bool>;
}

pub struct PgAccomplishmentRepository {
    pool: PgPool,
}

impl PgAccomplishmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccomplishmentRepository for PgAccomplishmentRepository {
    async fn create(&self, accomplishment: Accomplishment) -> Result<Accomplishment> {
        let row = sqlx::query_as::<_, Accomplishment>(&format!(
            "INSERT INTO accomplishments ({ACCOMPLISHMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {ACCOMPLISHMENT_COLUMNS}"
        ))
        .bind(&accomplishment.accomplishment_id)
        .bind(&accomplishment.user_id)
        .bind(&accomplishment.goal_id)
        .bind(&accomplishment.title)
        .bind(&accomplishment.description)
        .bind(&accomplishment.impact)
        .bind(&accomplishment.category)
        .bind(accomplishment.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Accomplishment>> {
        let rows = sqlx::query_as::<_, Accomplishment>(&format!(
            "SELECT {ACCOMPLISHMENT_COLUMNS} FROM accomplishments WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(rows)
    }

    async fn find_by_goal_id(&self, goal_id: &str) -> Result<Vec<Accomplishment>> {
        let rows = sqlx::query_as::<_, Accomplishment>(&format!(
            "SELECT {ACCOMPLISHMENT_COLUMNS} FROM accomplishments WHERE goal_id = $1 ORDER BY created_at ASC"
        ))
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(rows)
    }

    async fn delete(&self, accomplishment_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accomplishments WHERE accomplishment_id = $1")
            .bind(accomplishment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
