/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - repo エラー / 認可の拒否を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::RejectKind;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("insufficient scope: {0}")]
    InsufficientScope(String),
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::NotFound(message)
    }

    pub fn rejected(kind: RejectKind, message: String) -> Self {
        match kind {
            RejectKind::Unauthorized => Self::Unauthorized(message),
            RejectKind::InsufficientScope => Self::InsufficientScope(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message),
            AppError::InsufficientScope(message) => {
                (StatusCode::FORBIDDEN, "INSUFFICIENT_SCOPE", message)
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, "NOT_FOUND", message.into()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        (status, Json(ErrorResponse { message, code })).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "database error");
                AppError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthorized_renders_401_with_message() {
        let (status, body) = render(AppError::rejected(
            RejectKind::Unauthorized,
            "Bearer token missing".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Bearer token missing");
    }

    #[tokio::test]
    async fn insufficient_scope_renders_403() {
        let (status, body) = render(AppError::rejected(
            RejectKind::InsufficientScope,
            "Insufficient scope".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Insufficient scope");
        assert_eq!(body["code"], "INSUFFICIENT_SCOPE");
    }

    #[tokio::test]
    async fn not_found_keeps_resource_message() {
        let (status, body) = render(AppError::not_found("Taking course not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Taking course not found");
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let (status, body) = render(AppError::Internal).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "internal server error");
    }
}
