use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;

/// 要約の集計期間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Week,
    Month,
    Year,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Week => "week",
            Scope::Month => "month",
            Scope::Year => "year",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "week" => Ok(Scope::Week),
            "month" => Ok(Scope::Month),
            "year" => Ok(Scope::Year),
            _ => Err(AppError::ValidationError(format!(
                "Invalid scope '{}': expected week, month, or year",
                s
            ))),
        }
    }
}

/// 要約の種別（AI生成 or ユーザー手書き）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum SummaryType {
    #[serde(rename = "AI")]
    #[sqlx(rename = "AI")]
    Ai,
    #[serde(rename = "User")]
    #[sqlx(rename = "User")]
    User,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Summary {
    pub summary_id: String,
    pub user_id: String,
    pub scope: Scope,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")] // クライアント側のフィールド名は "type"
    pub summary_type: SummaryType,
    pub week_start: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SummaryList {
    pub summaries: Vec<Summary>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryCreateRequest {
    pub user_id: String,
    pub content: String,
    pub summary_type: SummaryType,
    pub week_start: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub scope: Scope,
}

#[derive(Debug, Deserialize)]
pub struct SummaryUpdateRequest {
    pub summary_text: String,
}

// AI要約生成リクエスト。必須チェックをハンドラ側で行うため全フィールドOption
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub summary_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default, rename = "goalsWithAccomplishments")]
    pub goals_with_accomplishments: Option<Vec<GoalInput>>,
    #[serde(default, rename = "summaryTitle")]
    pub summary_title: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// 要約プロンプトに含める1目標分の入力
#[derive(Debug, Clone, Deserialize)]
pub struct GoalInput {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_notes: Option<String>,
    #[serde(default)]
    pub status_set_at: Option<String>,
    #[serde(default)]
    pub accomplishments: Vec<AccomplishmentInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccomplishmentInput {
    pub title: String,
    pub description: String,
    pub impact: String,
}

const SUMMARY_COLUMNS: &str =
    "summary_id, user_id, scope, title, content, summary_type, week_start, created_at";

#[async_trait]
pub trait SummaryRepository: Send + Sync {
    async fn create(&self, summary: Summary) -> Result<Summary>;
    async fn update_content(&self, summary_id: &str, content: &str) -> Result<Option<Summary>>;
    async fn delete(&self, summary_id: &str) -> Result<bool>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Summary>>;
    async fn find_by_period(
        &self,
        user_id: &str,
        scope: Scope,
        week_start: NaiveDate,
    ) -> Result<Option<Summary>>;
}

pub struct PgSummaryRepository {
    pool: PgPool,
}

impl PgSummaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryRepository for PgSummaryRepository {
    async fn create(&self, summary: Summary) -> Result<Summary> {
        let row = sqlx::query_as::<_, Summary>(&format!(
            "INSERT INTO summaries ({SUMMARY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {SUMMARY_COLUMNS}"
        ))
        .bind(&summary.summary_id)
        .bind(&summary.user_id)
        .bind(summary.scope)
        .bind(&summary.title)
        .bind(&summary.content)
        .bind(summary.summary_type)
        .bind(summary.week_start)
        .bind(summary.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row)
    }

    async fn update_content(&self, summary_id: &str, content: &str) -> Result<Option<Summary>> {
        let row = sqlx::query_as::<_, Summary>(&format!(
            "UPDATE summaries SET content = $1 WHERE summary_id = $2 RETURNING {SUMMARY_COLUMNS}"
        ))
        .bind(content)
        .bind(summary_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row)
    }

    async fn delete(&self, summary_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM summaries WHERE summary_id = $1")
            .bind(summary_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Summary>> {
        let rows = sqlx::query_as::<_, Summary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM summaries WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(rows)
    }

    async fn find_by_period(
        &self,
        user_id: &str,
        scope: Scope,
        week_start: NaiveDate,
    ) -> Result<Option<Summary>> {
        let row = sqlx::query_as::<_, Summary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM summaries WHERE user_id = $1 AND scope = $2 AND week_start = $3 ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(scope)
        .bind(week_start)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parses_known_values() {
        assert_eq!(Scope::from_str("week").unwrap(), Scope::Week);
        assert_eq!(Scope::from_str("month").unwrap(), Scope::Month);
        assert_eq!(Scope::from_str("year").unwrap(), Scope::Year);
        assert!(Scope::from_str("quarter").is_err());
    }

    #[test]
    fn summary_type_uses_wire_names() {
        assert_eq!(serde_json::to_string(&SummaryType::Ai).unwrap(), "\"AI\"");
        assert_eq!(serde_json::to_string(&SummaryType::User).unwrap(), "\"User\"");
        let parsed: SummaryType = serde_json::from_str("\"AI\"").unwrap();
        assert_eq!(parsed, SummaryType::Ai);
    }

    #[test]
    fn summarize_request_accepts_camel_case_keys() {
        let req: SummarizeRequest = serde_json::from_str(
            r#"{
                "summary_id": "s1",
                "user_id": "u1",
                "week_start": "2025-06-02",
                "goalsWithAccomplishments": [],
                "summaryTitle": "Summary for week: June 2, 2025",
                "scope": "week"
            }"#,
        )
        .unwrap();
        assert_eq!(req.summary_id.as_deref(), Some("s1"));
        assert_eq!(req.summary_title.as_deref(), Some("Summary for week: June 2, 2025"));
        assert!(req.goals_with_accomplishments.unwrap().is_empty());
    }
}
