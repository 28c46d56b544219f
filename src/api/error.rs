use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use tracing::field::display;

use crate::gemini::GeminiError;
use crate::ledger::LedgerError;
use crate::onboarding::OnboardingError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Invalid(#[from] LedgerError),
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("AI service unavailable: {0}")]
    Upstream(#[from] GeminiError),
    #[error("database error: {0}")]
    Database(DbErr),
    #[error("{0}")]
    Internal(String),
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ApiError::Conflict("Email already exists".to_string())
            }
            _ => ApiError::Database(err),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Invalid(_) | ApiError::Onboarding(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::Span::current().record("error", display(&self));
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = match &self {
            ApiError::Onboarding(e) => json!({ "error": e.message, "step": e.step }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::Step;

    #[test]
    fn statuses() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Invalid(LedgerError::Negative { field: "calories" }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound("User").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Upstream(GeminiError::EmptyReply).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(DbErr::Custom("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn onboarding_error_reports_the_step() {
        let response =
            ApiError::from(OnboardingError::new(Step::Body, "Enter a valid weight")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["step"], "body");
        assert_eq!(body["error"], "Enter a valid weight");
    }
}
