use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::types::{Challenge, LoginCodeMessage, Mutation};
use crate::error::AuthServiceError;

/// Keyed store of pending challenges, one entry per normalized identity.
///
/// Implementations must make `put` and `modify` atomic per identity so that two
/// racing verifications can never both consume the same challenge.
pub trait ChallengeStore: Send + Sync {
    /// Insert the challenge, replacing any entry for the same identity.
    fn put(&self, challenge: &Challenge) -> impl Future<Output = Result<(), AuthServiceError>> + Send;

    /// Atomic read-modify-write on one identity's entry.
    ///
    /// `f` receives the current entry and returns the mutation to apply along
    /// with a value handed back to the caller. `f` may run more than once when
    /// the backend retries an optimistic transaction, so it must be pure.
    fn modify<T, F>(
        &self,
        identity: &str,
        f: F,
    ) -> impl Future<Output = Result<T, AuthServiceError>> + Send
    where
        T: Send,
        F: FnMut(Option<&Challenge>) -> (Mutation, T) + Send;

    /// Drop every challenge that expired before `now`. Returns how many were removed.
    fn purge_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, AuthServiceError>> + Send;

    /// Readiness probe for the backing service.
    fn ping(&self) -> impl Future<Output = Result<(), AuthServiceError>> + Send;
}

/// Delivers login codes to the claimed address.
pub trait Notifier: Send + Sync {
    fn send(&self, message: &LoginCodeMessage) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Wall-clock source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
