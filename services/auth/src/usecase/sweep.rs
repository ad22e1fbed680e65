use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::domain::repository::{ChallengeStore, Clock, Notifier};
use crate::usecase::challenge::Authenticator;

/// Periodically drop challenges that expired without being verified.
///
/// Only keeps memory bounded; verification already treats expired entries
/// correctly whether or not the sweep has reached them.
pub fn spawn_sweeper<S, N, C>(
    authenticator: Arc<Authenticator<S, N, C>>,
    every: Duration,
) -> JoinHandle<()>
where
    S: ChallengeStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match authenticator.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "purged expired login codes"),
                Err(e) => warn!(error = %e, "expired login code sweep failed"),
            }
        }
    })
}
