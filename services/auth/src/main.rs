use std::sync::Arc;

use anyhow::Context as _;
use tracing::info;

use passcode_auth::config::{AuthConfig, NotifierKind, StoreKind};
use passcode_auth::infra::cache::RedisChallengeStore;
use passcode_auth::infra::clock::SystemClock;
use passcode_auth::infra::memory::MemoryChallengeStore;
use passcode_auth::infra::notifier::{LogNotifier, NotifierBackend, SmtpNotifier};
use passcode_auth::infra::store::StoreBackend;
use passcode_auth::router::build_router;
use passcode_auth::state::ServiceState;
use passcode_auth::usecase::challenge::Authenticator;
use passcode_auth::usecase::sweep::spawn_sweeper;
use passcode_core::config::Config;
use passcode_core::tracing::init_tracing;

fn build_store(config: &AuthConfig) -> anyhow::Result<StoreBackend> {
    match config.otp_store {
        StoreKind::Memory => Ok(StoreBackend::Memory(MemoryChallengeStore::new())),
        StoreKind::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL is required when OTP_STORE=redis")?;
            let pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .context("failed to create Redis pool")?;
            Ok(StoreBackend::Redis(RedisChallengeStore {
                pool,
                grace_secs: config.otp_redis_grace_secs,
            }))
        }
    }
}

fn build_notifier(config: &AuthConfig) -> anyhow::Result<NotifierBackend> {
    match config.otp_notifier {
        NotifierKind::Log => Ok(NotifierBackend::Log(LogNotifier)),
        NotifierKind::Smtp => {
            let smtp = config.smtp()?;
            Ok(NotifierBackend::Smtp(SmtpNotifier::new(&smtp)?))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AuthConfig::from_env().context("failed to load config from environment")?;
    config.validate()?;

    let authenticator = Arc::new(Authenticator {
        store: build_store(&config)?,
        notifier: build_notifier(&config)?,
        clock: SystemClock,
        settings: config.authenticator_settings(),
    });
    info!(
        store = ?config.otp_store,
        notifier = ?config.otp_notifier,
        notify_policy = ?authenticator.settings.notify_policy,
        "login code authenticator configured"
    );

    if let Some(every) = config.sweep_interval() {
        spawn_sweeper(Arc::clone(&authenticator), every);
    }

    let state = ServiceState::new(authenticator);
    let router = build_router(state, &config.allowed_origins());
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
