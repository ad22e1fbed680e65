use chrono::Duration;
use rand::RngExt;
use tracing::{info, warn};

use crate::domain::repository::{ChallengeStore, Clock, Notifier};
use crate::domain::types::{
    CODE_MAX, CODE_MIN, Challenge, IssuedChallenge, LoginCodeMessage, Mutation, NotifyPolicy,
    Verified, mask_identity, normalize_identity,
};
use crate::error::AuthServiceError;

fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(CODE_MIN..=CODE_MAX).to_string()
}

/// Treat absent and whitespace-only inputs alike.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Behavior knobs for the authenticator, resolved from config at startup.
#[derive(Debug, Clone)]
pub struct AuthenticatorSettings {
    pub code_ttl: Duration,
    /// `0` disables the bound.
    pub max_attempts: u32,
    pub require_role: bool,
    pub default_role: String,
    /// Empty means any role is accepted.
    pub allowed_roles: Vec<String>,
    pub notify_policy: NotifyPolicy,
    pub app_name: String,
}

pub struct IssueInput {
    pub identity: Option<String>,
    pub role: Option<String>,
}

pub struct VerifyInput {
    pub identity: Option<String>,
    pub code: Option<String>,
}

/// Issues and verifies one-time login codes.
pub struct Authenticator<S, N, C>
where
    S: ChallengeStore,
    N: Notifier,
    C: Clock,
{
    pub store: S,
    pub notifier: N,
    pub clock: C,
    pub settings: AuthenticatorSettings,
}

impl<S, N, C> Authenticator<S, N, C>
where
    S: ChallengeStore,
    N: Notifier,
    C: Clock,
{
    /// Store a fresh challenge for the identity and announce its code.
    ///
    /// The challenge is committed before the notifier runs, so a notifier
    /// failure never leaves the store half-updated.
    pub async fn issue(&self, input: IssueInput) -> Result<IssuedChallenge, AuthServiceError> {
        let address = present(input.identity);
        let role = present(input.role);

        let Some(address) = address else {
            let message = if self.settings.require_role {
                "identity and role are required"
            } else {
                "identity is required"
            };
            return Err(AuthServiceError::InvalidRequest(message.to_owned()));
        };
        let role = match role {
            Some(role) => role,
            None if !self.settings.require_role => self.settings.default_role.clone(),
            None => {
                return Err(AuthServiceError::InvalidRequest(
                    "identity and role are required".to_owned(),
                ));
            }
        };

        if !self.settings.allowed_roles.is_empty() && !self.settings.allowed_roles.contains(&role)
        {
            return Err(AuthServiceError::InvalidRequest(format!(
                "role {role} is not allowed"
            )));
        }

        let identity = normalize_identity(&address);
        let now = self.clock.now();
        let challenge = Challenge {
            identity: identity.clone(),
            code: generate_code(),
            role,
            issued_at: now,
            expires_at: now + self.settings.code_ttl,
            failed_attempts: 0,
        };

        self.store.put(&challenge).await?;
        let masked = mask_identity(&identity);
        info!(identity = %masked, role = %challenge.role, "login code issued");

        let message = LoginCodeMessage {
            to: address,
            code: challenge.code,
            expires_in: self.settings.code_ttl,
            app_name: self.settings.app_name.clone(),
        };
        if let Err(e) = self.notifier.send(&message).await {
            match self.settings.notify_policy {
                NotifyPolicy::Strict => return Err(AuthServiceError::NotificationFailure(e)),
                NotifyPolicy::BestEffort => {
                    warn!(identity = %masked, error = %e, "login code notification failed");
                }
            }
        }

        Ok(IssuedChallenge {
            identity,
            expires_at: challenge.expires_at,
        })
    }

    /// Check a submitted code against the identity's pending challenge.
    ///
    /// Success and expiry consume the challenge. A wrong code leaves it in
    /// place until the attempt budget runs out.
    pub async fn verify(&self, input: VerifyInput) -> Result<Verified, AuthServiceError> {
        let (Some(address), Some(code)) = (present(input.identity), present(input.code)) else {
            return Err(AuthServiceError::InvalidRequest(
                "identity and code are required".to_owned(),
            ));
        };

        let identity = normalize_identity(&address);
        let now = self.clock.now();
        let max_attempts = self.settings.max_attempts;

        let outcome = self
            .store
            .modify(&identity, |current| match current {
                None => (Mutation::Keep, Err(AuthServiceError::ChallengeNotFound)),
                Some(challenge) if challenge.is_expired(now) => {
                    (Mutation::Delete, Err(AuthServiceError::ChallengeExpired))
                }
                Some(challenge) if !challenge.matches(&code) => {
                    let next = challenge.with_failed_attempt();
                    if max_attempts > 0 && next.failed_attempts >= max_attempts {
                        (Mutation::Delete, Err(AuthServiceError::AttemptsExhausted))
                    } else {
                        (Mutation::Replace(next), Err(AuthServiceError::CodeMismatch))
                    }
                }
                Some(challenge) => (
                    Mutation::Delete,
                    Ok(Verified {
                        identity: challenge.identity.clone(),
                        role: challenge.role.clone(),
                    }),
                ),
            })
            .await?;

        let masked = mask_identity(&identity);
        match &outcome {
            Ok(_) => info!(identity = %masked, "login code verified"),
            Err(AuthServiceError::AttemptsExhausted) => {
                warn!(identity = %masked, "login code attempts exhausted")
            }
            Err(e) => info!(identity = %masked, kind = e.kind(), "login code rejected"),
        }
        outcome
    }

    /// Remove challenges nobody came back for.
    pub async fn purge_expired(&self) -> Result<u64, AuthServiceError> {
        self.store.purge_expired(self.clock.now()).await
    }
}
