use crate::{
    error::{AppError, Result},
    repositories::{
        GoalInput, PgSummaryRepository, Scope, Summary, SummaryCreateRequest, SummaryRepository,
    },
    services::{prompt, OpenAiClient, ProviderPacer},
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::goal_service::validate_text_field;

const CONTENT_MAX_LENGTH: usize = 10_000;

/// 検証済みのAI要約生成リクエスト
#[derive(Debug)]
pub struct SummarizePayload {
    pub summary_id: String,
    pub user_id: String,
    pub week_start: NaiveDate,
    pub goals: Vec<GoalInput>,
    pub summary_title: String,
    pub scope: Scope,
}

pub struct SummaryService {
    summary_repo: Arc<PgSummaryRepository>,
    openai: Arc<OpenAiClient>,
    pacer: Arc<ProviderPacer>,
}

impl SummaryService {
    pub fn new(
        summary_repo: Arc<PgSummaryRepository>,
        openai: Arc<OpenAiClient>,
        pacer: Arc<ProviderPacer>,
    ) -> Self {
        Self {
            summary_repo,
            openai,
            pacer,
        }
    }

    /// AI要約を生成して返す。DBへの書き込みは行わない。
    /// 永続化はクライアントが別リクエスト（create/update）で行う。
    pub async fn generate(&self, payload: &SummarizePayload) -> Result<String> {
        let prompt = prompt::compose_summary_prompt(
            payload.scope,
            &payload.summary_title,
            payload.week_start,
            &payload.goals,
        );

        tracing::info!(
            user_id = %payload.user_id,
            scope = %payload.scope,
            goals = payload.goals.len(),
            "generating summary"
        );

        // プロバイダ呼び出しはペーサーを通して直列化する
        self.pacer.run(|| self.openai.complete(&prompt)).await
    }

    pub async fn create(&self, req: SummaryCreateRequest) -> Result<Summary> {
        validate_text_field("title", &req.title, 200)?;
        validate_text_field("content", &req.content, CONTENT_MAX_LENGTH)?;

        let summary = Summary {
            summary_id: Uuid::new_v4().to_string(),
            user_id: req.user_id,
            scope: req.scope,
            title: req.title,
            content: req.content,
            summary_type: req.summary_type,
            week_start: req.week_start,
            created_at: Utc::now(),
        };

        self.summary_repo.create(summary).await
    }

    pub async fn update_content(&self, summary_id: &str, new_content: &str) -> Result<Summary> {
        validate_text_field("summary_text", new_content, CONTENT_MAX_LENGTH)?;

        self.summary_repo
            .update_content(summary_id, new_content)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Summary {} not found", summary_id)))
    }

    pub async fn delete(&self, summary_id: &str) -> Result<()> {
        if !self.summary_repo.delete(summary_id).await? {
            return Err(AppError::NotFound(format!(
                "Summary {} not found",
                summary_id
            )));
        }
        Ok(())
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Summary>> {
        self.summary_repo.find_by_user_id(user_id).await
    }

    /// (scope, 期間開始日)に対応する現在の要約を返す
    pub async fn find_by_period(
        &self,
        user_id: &str,
        scope: Scope,
        week_start: NaiveDate,
    ) -> Result<Option<Summary>> {
        self.summary_repo
            .find_by_period(user_id, scope, week_start)
            .await
    }
}
