use axum::{extract::State, http::StatusCode};

use crate::domain::repository::{ChallengeStore, Clock, Notifier};
use crate::error::AuthServiceError;
use crate::state::AppState;

/// Handler for `GET /readyz`: ready once the challenge store answers.
pub async fn readyz<S, N, C>(
    State(state): State<AppState<S, N, C>>,
) -> Result<StatusCode, AuthServiceError>
where
    S: ChallengeStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    state.authenticator.store.ping().await?;
    Ok(StatusCode::OK)
}
