use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Domain errors for the trivia core. Every store failure is observable by
/// the caller; nothing is swallowed below this boundary.
#[derive(Debug, Error)]
pub enum TriviaError {
    #[error("No trivia available for today")]
    GameNotFound,

    #[error("Question {0} not found")]
    QuestionNotFound(String),

    #[error("Question {0} is not part of today's game")]
    QuestionNotInGame(String),

    #[error("Question already answered today")]
    AlreadyAnswered,

    #[error("Question pool has too few questions for a game")]
    PoolTooSmall,

    #[error("{0}")]
    Validation(String),

    #[error("Record store unavailable: {0}")]
    Store(#[from] mongodb::error::Error),

    /// Deleting stored answers failed. The reset endpoint degrades this to a
    /// non-persisted success so the client can clear local state anyway.
    #[error("Failed to clear stored answers: {0}")]
    ResetPartialFailure(#[source] mongodb::error::Error),
}

impl TriviaError {
    fn status(&self) -> StatusCode {
        match self {
            TriviaError::GameNotFound
            | TriviaError::QuestionNotFound(_)
            | TriviaError::QuestionNotInGame(_)
            | TriviaError::PoolTooSmall => StatusCode::NOT_FOUND,
            TriviaError::AlreadyAnswered => StatusCode::CONFLICT,
            TriviaError::Validation(_) => StatusCode::BAD_REQUEST,
            TriviaError::Store(_) | TriviaError::ResetPartialFailure(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl IntoResponse for TriviaError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = json!({
            "message": self.to_string(),
            "status": status.as_u16()
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_error() -> mongodb::error::Error {
        mongodb::error::Error::custom("connection refused")
    }

    #[test]
    fn store_failures_map_to_service_unavailable() {
        let response = TriviaError::Store(store_error()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = TriviaError::ResetPartialFailure(store_error()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn domain_errors_map_to_client_codes() {
        assert_eq!(
            TriviaError::GameNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TriviaError::QuestionNotInGame("q1".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TriviaError::AlreadyAnswered.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            TriviaError::Validation("user_id must not be empty".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
