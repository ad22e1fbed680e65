use chrono::{DateTime, Utc};

use crate::domain::repository::ChallengeStore;
use crate::domain::types::{Challenge, Mutation};
use crate::error::AuthServiceError;
use crate::infra::cache::RedisChallengeStore;
use crate::infra::memory::MemoryChallengeStore;

/// Challenge store selected at startup.
#[derive(Clone)]
pub enum StoreBackend {
    Memory(MemoryChallengeStore),
    Redis(RedisChallengeStore),
}

impl ChallengeStore for StoreBackend {
    async fn put(&self, challenge: &Challenge) -> Result<(), AuthServiceError> {
        match self {
            Self::Memory(inner) => inner.put(challenge).await,
            Self::Redis(inner) => inner.put(challenge).await,
        }
    }

    async fn modify<T, F>(&self, identity: &str, f: F) -> Result<T, AuthServiceError>
    where
        T: Send,
        F: FnMut(Option<&Challenge>) -> (Mutation, T) + Send,
    {
        match self {
            Self::Memory(inner) => inner.modify(identity, f).await,
            Self::Redis(inner) => inner.modify(identity, f).await,
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        match self {
            Self::Memory(inner) => inner.purge_expired(now).await,
            Self::Redis(inner) => inner.purge_expired(now).await,
        }
    }

    async fn ping(&self) -> Result<(), AuthServiceError> {
        match self {
            Self::Memory(inner) => inner.ping().await,
            Self::Redis(inner) => inner.ping().await,
        }
    }
}
