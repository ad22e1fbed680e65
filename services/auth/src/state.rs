use std::sync::Arc;

use crate::domain::repository::{ChallengeStore, Clock, Notifier};
use crate::infra::clock::SystemClock;
use crate::infra::notifier::NotifierBackend;
use crate::infra::store::StoreBackend;
use crate::usecase::challenge::Authenticator;

/// Shared application state passed to every handler via axum `State`.
pub struct AppState<S, N, C>
where
    S: ChallengeStore,
    N: Notifier,
    C: Clock,
{
    pub authenticator: Arc<Authenticator<S, N, C>>,
}

impl<S, N, C> AppState<S, N, C>
where
    S: ChallengeStore,
    N: Notifier,
    C: Clock,
{
    pub fn new(authenticator: Arc<Authenticator<S, N, C>>) -> Self {
        Self { authenticator }
    }
}

impl<S, N, C> Clone for AppState<S, N, C>
where
    S: ChallengeStore,
    N: Notifier,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

/// State wired from configuration in `main`.
pub type ServiceState = AppState<StoreBackend, NotifierBackend, SystemClock>;
