use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::repository::ChallengeStore;
use crate::domain::types::{Challenge, Mutation};
use crate::error::AuthServiceError;

/// In-process challenge store. Lives as long as the process.
///
/// Each `modify` runs its closure while holding the entry's shard lock, which
/// never spans an await point, so unrelated identities are never held up by a
/// slow request.
#[derive(Clone, Default)]
pub struct MemoryChallengeStore {
    entries: Arc<DashMap<String, Challenge>>,
}

impl MemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current entry for `identity`.
    pub fn get(&self, identity: &str) -> Option<Challenge> {
        self.entries.get(identity).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ChallengeStore for MemoryChallengeStore {
    async fn put(&self, challenge: &Challenge) -> Result<(), AuthServiceError> {
        self.entries
            .insert(challenge.identity.clone(), challenge.clone());
        Ok(())
    }

    async fn modify<T, F>(&self, identity: &str, mut f: F) -> Result<T, AuthServiceError>
    where
        T: Send,
        F: FnMut(Option<&Challenge>) -> (Mutation, T) + Send,
    {
        let out = match self.entries.entry(identity.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let (mutation, out) = f(Some(occupied.get()));
                match mutation {
                    Mutation::Keep => {}
                    Mutation::Delete => {
                        occupied.remove();
                    }
                    Mutation::Replace(next) => {
                        occupied.insert(next);
                    }
                }
                out
            }
            Entry::Vacant(vacant) => {
                let (mutation, out) = f(None);
                if let Mutation::Replace(next) = mutation {
                    vacant.insert(next);
                }
                out
            }
        };
        Ok(out)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let mut removed = 0u64;
        self.entries.retain(|_, challenge| {
            let keep = !challenge.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), AuthServiceError> {
        Ok(())
    }
}
