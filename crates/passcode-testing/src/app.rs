use std::sync::Arc;

use axum_test::TestServer;
use chrono::Duration;

use passcode_auth::domain::types::NotifyPolicy;
use passcode_auth::infra::memory::MemoryChallengeStore;
use passcode_auth::router::build_router;
use passcode_auth::state::AppState;
use passcode_auth::usecase::challenge::{Authenticator, AuthenticatorSettings};

use crate::clock::ManualClock;
use crate::notifier::RecordingNotifier;

/// Settings matching the service defaults.
pub fn default_settings() -> AuthenticatorSettings {
    AuthenticatorSettings {
        code_ttl: Duration::minutes(10),
        max_attempts: 5,
        require_role: true,
        default_role: "candidate".to_owned(),
        allowed_roles: vec![],
        notify_policy: NotifyPolicy::BestEffort,
        app_name: "JobBoard".to_owned(),
    }
}

pub type TestAuthenticator = Authenticator<MemoryChallengeStore, RecordingNotifier, ManualClock>;

/// Authenticator over an in-memory store, a recording notifier and a manual clock.
pub fn authenticator(settings: AuthenticatorSettings) -> TestAuthenticator {
    Authenticator {
        store: MemoryChallengeStore::new(),
        notifier: RecordingNotifier::new(),
        clock: ManualClock::at_epoch(),
        settings,
    }
}

/// The auth router served in-process, with handles on its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryChallengeStore,
    pub notifier: RecordingNotifier,
    pub clock: ManualClock,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(default_settings())
    }

    pub fn with_settings(settings: AuthenticatorSettings) -> Self {
        let authenticator = authenticator(settings);
        let store = authenticator.store.clone();
        let notifier = authenticator.notifier.clone();
        let clock = authenticator.clock.clone();

        let router = build_router(AppState::new(Arc::new(authenticator)), &[]);
        let server = TestServer::new(router).expect("failed to start test server");

        Self {
            server,
            store,
            notifier,
            clock,
        }
    }

    /// `POST /auth/request-code` and return the code that was "sent".
    pub async fn request_code(&self, identity: &str, role: &str) -> String {
        self.server
            .post("/auth/request-code")
            .json(&serde_json::json!({ "identity": identity, "role": role }))
            .await
            .assert_status_ok();
        self.notifier.last_code()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
