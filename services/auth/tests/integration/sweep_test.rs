use std::sync::Arc;

use chrono::Duration;

use passcode_auth::usecase::sweep::spawn_sweeper;
use passcode_testing::app::{authenticator, default_settings};

use crate::helpers::{EMAIL, issue};

#[tokio::test(start_paused = true)]
async fn should_sweep_expired_challenges_periodically() {
    let auth = Arc::new(authenticator(default_settings()));

    issue(auth.as_ref(), EMAIL, "candidate").await.unwrap();
    issue(auth.as_ref(), "fresh@b.com", "candidate").await.unwrap();
    auth.clock.advance(Duration::minutes(11));
    issue(auth.as_ref(), "fresh@b.com", "candidate").await.unwrap();

    let handle = spawn_sweeper(Arc::clone(&auth), std::time::Duration::from_secs(60));

    // Nothing is swept before the first interval elapses.
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    assert_eq!(auth.store.len(), 2);

    tokio::time::sleep(std::time::Duration::from_secs(31)).await;
    assert!(auth.store.get(EMAIL).is_none());
    assert!(auth.store.get("fresh@b.com").is_some());

    handle.abort();
}
