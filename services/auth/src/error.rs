use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// OTP auth service error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("no code was requested for this identity")]
    ChallengeNotFound,
    #[error("code has expired, request a new one")]
    ChallengeExpired,
    #[error("incorrect code")]
    CodeMismatch,
    #[error("too many incorrect attempts, request a new code")]
    AttemptsExhausted,
    #[error("failed to send login code")]
    NotificationFailure(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            Self::ChallengeExpired => "CHALLENGE_EXPIRED",
            Self::CodeMismatch => "CODE_MISMATCH",
            Self::AttemptsExhausted => "ATTEMPTS_EXHAUSTED",
            Self::NotificationFailure(_) => "NOTIFICATION_FAILURE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<JsonRejection> for AuthServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRequest(_)
            | Self::ChallengeNotFound
            | Self::ChallengeExpired
            | Self::CodeMismatch => StatusCode::BAD_REQUEST,
            Self::AttemptsExhausted => StatusCode::TOO_MANY_REQUESTS,
            Self::NotificationFailure(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Only 5xx are logged here; TraceLayer already records every request's status.
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            Self::NotificationFailure(e) => {
                tracing::error!(error = %e, kind = "NOTIFICATION_FAILURE", "notifier failed")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
