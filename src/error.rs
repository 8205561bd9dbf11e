use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    ValidationError(String),
    /// 必須フィールド欠落（フィールド名 -> true のマップを返す）
    MissingFields(BTreeMap<String, bool>),
    MethodNotAllowed,
    RateLimited(String),
    DatabaseError(String),
    ExternalServiceError(String),
    ConfigError(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::MissingFields(fields) => {
                let names: Vec<&str> = fields.keys().map(|k| k.as_str()).collect();
                write!(f, "Missing required fields: {}", names.join(", "))
            }
            AppError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            AppError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ExternalServiceError(msg) => write!(f, "External service error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(rename = "missingFields", skip_serializing_if = "Option::is_none")]
    missing_fields: Option<BTreeMap<String, bool>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // DB・設定の失敗は詳細をログに残し、クライアントには汎用メッセージのみ返す
        let (status, message, missing_fields) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::MissingFields(fields) => (
                StatusCode::BAD_REQUEST,
                "Missing required fields".to_string(),
                Some(fields),
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed".to_string(),
                None,
            ),
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg, None),
            AppError::DatabaseError(msg) => {
                tracing::error!("database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            // 詳細は投げた側でログ済み。msg自体は汎用文言
            AppError::ExternalServiceError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            AppError::ConfigError(msg) => {
                tracing::error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                missing_fields,
            }),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_maps_to_400() {
        let mut fields = BTreeMap::new();
        fields.insert("user_id".to_string(), true);
        let response = AppError::MissingFields(fields).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn method_not_allowed_maps_to_405() {
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn database_detail_is_not_leaked() {
        let response =
            AppError::DatabaseError("connection refused at 10.0.0.1:5432".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
