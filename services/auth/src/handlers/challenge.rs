use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use passcode_core::serde::to_rfc3339_ms;

use crate::domain::repository::{ChallengeStore, Clock, Notifier};
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::challenge::{IssueInput, VerifyInput};

// ── POST /auth/request-code ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestCodeRequest {
    #[serde(default, alias = "email")]
    pub identity: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct RequestCodeResponse {
    pub message: &'static str,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

pub async fn request_code<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    payload: Result<Json<RequestCodeRequest>, JsonRejection>,
) -> Result<Json<RequestCodeResponse>, AuthServiceError>
where
    S: ChallengeStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let Json(body) = payload?;
    let issued = state
        .authenticator
        .issue(IssueInput {
            identity: body.identity,
            role: body.role,
        })
        .await?;

    Ok(Json(RequestCodeResponse {
        message: "login code sent",
        expires_at: issued.expires_at,
    }))
}

// ── POST /auth/verify-code ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    #[serde(default, alias = "email")]
    pub identity: Option<String>,
    #[serde(default, alias = "otp", deserialize_with = "code_text")]
    pub code: Option<String>,
}

/// Browser forms often post the code as a JSON number.
fn code_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Digits(u64),
    }

    Ok(Option::<Code>::deserialize(deserializer)?.map(|code| match code {
        Code::Text(text) => text,
        Code::Digits(digits) => digits.to_string(),
    }))
}

#[derive(Serialize)]
pub struct VerifyCodeResponse {
    pub identity: String,
    pub role: String,
}

pub async fn verify_code<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    payload: Result<Json<VerifyCodeRequest>, JsonRejection>,
) -> Result<Json<VerifyCodeResponse>, AuthServiceError>
where
    S: ChallengeStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let Json(body) = payload?;
    let verified = state
        .authenticator
        .verify(VerifyInput {
            identity: body.identity,
            code: body.code,
        })
        .await?;

    Ok(Json(VerifyCodeResponse {
        identity: verified.identity,
        role: verified.role,
    }))
}
