use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use passcode_core::error::{method_not_allowed, not_found};
use passcode_core::health::healthz;
use passcode_core::middleware::{cors_layer, propagate_request_id_layer, request_id_layer};

use crate::domain::repository::{ChallengeStore, Clock, Notifier};
use crate::handlers::{
    challenge::{request_code, verify_code},
    health::readyz,
};
use crate::state::AppState;

pub fn build_router<S, N, C>(state: AppState<S, N, C>, allowed_origins: &[String]) -> Router
where
    S: ChallengeStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<S, N, C>))
        // Login codes
        .route("/auth/request-code", post(request_code::<S, N, C>))
        .route("/auth/verify-code", post(verify_code::<S, N, C>))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
}
