use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Goal {
    pub goal_id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub week_start: NaiveDate,
    pub status: Option<String>,
    pub status_notes: Option<String>,
    pub status_set_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct GoalList {
    pub goals: Vec<Goal>,
}

#[derive(Debug, Deserialize)]
pub struct GoalCreateRequest {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub week_start: NaiveDate,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalUpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub week_start: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_notes: Option<String>,
}

const GOAL_COLUMNS: &str = "goal_id, user_id, title, description, category, week_start, status, status_notes, status_set_at, created_at";

#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn create(&self, goal: Goal) -> Result<Goal>;
    async fn find_by_id(&self, goal_id: &str) -> Result<Option<Goal>>;
    async fn find_by_user_id(
        &self,
        user_id: &str,
        week_start: Option<NaiveDate>,
    ) -> Result<Vec<Goal>>;
    async fn update(
        &self,
        goal_id: &str,
        req: &GoalUpdateRequest,
        status_set_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Goal>>;
    async fn delete(&self, goal_id: &str) -> Result<bool>;
}

pub struct PgGoalRepository {
    pool: PgPool,
}

impl PgGoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalRepository for PgGoalRepository {
    async fn create(&self, goal: Goal) -> Result<Goal> {
        let row = sqlx::query_as::<_, Goal>(&format!(
            "INSERT INTO goals ({GOAL_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {GOAL_COLUMNS}"
        ))
        .bind(&goal.goal_id)
        .bind(&goal.user_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(&goal.category)
        .bind(goal.week_start)
        .bind(&goal.status)
        .bind(&goal.status_notes)
        .bind(goal.status_set_at)
        .bind(goal.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row)
    }

    async fn find_by_id(&self, goal_id: &str) -> Result<Option<Goal>> {
        let row = sqlx::query_as::<_, Goal>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE goal_id = $1"
        ))
        .bind(goal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row)
    }

    async fn find_by_user_id(
        &self,
        user_id: &str,
        week_start: Option<NaiveDate>,
    ) -> Result<Vec<Goal>> {
        // week_start指定時はその週の目標のみに絞り込む
        let rows = match week_start {
            Some(week_start) => {
                sqlx::query_as::<_, Goal>(&format!(
                    "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 AND week_start = $2 ORDER BY created_at ASC"
                ))
                .bind(user_id)
                .bind(week_start)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Goal>(&format!(
                    "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 ORDER BY created_at ASC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(rows)
    }

    async fn update(
        &self,
        goal_id: &str,
        req: &GoalUpdateRequest,
        status_set_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Goal>> {
        let row = sqlx::query_as::<_, Goal>(&format!(
            "UPDATE goals SET \
                title = COALESCE($1, title), \
                description = COALESCE($2, description), \
                category = COALESCE($3, category), \
                week_start = COALESCE($4, week_start), \
                status = COALESCE($5, status), \
                status_notes = COALESCE($6, status_notes), \
                status_set_at = COALESCE($7, status_set_at) \
             WHERE goal_id = $8 RETURNING {GOAL_COLUMNS}"
        ))
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.category)
        .bind(req.week_start)
        .bind(&req.status)
        .bind(&req.status_notes)
        .bind(status_set_at)
        .bind(goal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row)
    }

    async fn delete(&self, goal_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE goal_id = $1")
            .bind(goal_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
