use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Pending one-time login challenge for a single identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Normalized identity; the store key.
    pub identity: String,
    pub code: String,
    /// Caller-asserted role, echoed back on successful verification.
    pub role: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub failed_attempts: u32,
}

impl Challenge {
    /// A challenge is still usable at exactly `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Compares in time independent of where the codes first differ.
    pub fn matches(&self, submitted: &str) -> bool {
        let (expected, submitted) = (self.code.as_bytes(), submitted.as_bytes());
        expected.len() == submitted.len()
            && expected
                .iter()
                .zip(submitted)
                .fold(0u8, |diff, (a, b)| diff | (a ^ b))
                == 0
    }

    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.issued_at
    }

    /// Copy of this challenge with one more failed attempt recorded.
    pub fn with_failed_attempt(&self) -> Self {
        Self {
            failed_attempts: self.failed_attempts.saturating_add(1),
            ..self.clone()
        }
    }
}

/// What a store should do with an identity's entry after an atomic inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Keep,
    Delete,
    Replace(Challenge),
}

/// Result of a successful `issue`.
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    pub identity: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful `verify`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    pub identity: String,
    pub role: String,
}

/// Outbound message announcing a login code.
#[derive(Debug, Clone)]
pub struct LoginCodeMessage {
    /// Address as the requester typed it (trimmed, case preserved).
    pub to: String,
    pub code: String,
    pub expires_in: Duration,
    pub app_name: String,
}

impl LoginCodeMessage {
    pub fn subject(&self) -> String {
        format!("Your {} login code", self.app_name)
    }

    pub fn body(&self) -> String {
        let minutes = self.expires_in.num_minutes().max(1);
        format!(
            "Hi,\n\n\
             Your one-time login code for {app} is:\n\n\
             {code}\n\n\
             This code is valid for {minutes} minutes. \
             If you did not request it, you can ignore this email.\n\n\
             {app}",
            app = self.app_name,
            code = self.code,
        )
    }
}

/// How `issue` reacts when the notifier fails. One policy per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// Log the failure and report success; the challenge stays valid.
    #[default]
    BestEffort,
    /// Fail the request with `NotificationFailure`; the challenge stays stored.
    Strict,
}

/// Trim and lower-case an identity so lookups are case-insensitive.
pub fn normalize_identity(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Log-safe form of an identity: first character of the local part, then the domain.
pub fn mask_identity(identity: &str) -> String {
    match identity.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_owned(),
    }
}

/// Number of digits in a login code.
pub const CODE_LEN: usize = 6;

/// Smallest code value; codes never start with zero.
pub const CODE_MIN: u32 = 100_000;

/// Largest code value.
pub const CODE_MAX: u32 = 999_999;

/// Default challenge lifetime in seconds.
pub const DEFAULT_CODE_TTL_SECS: u64 = 600;

/// Default number of wrong codes tolerated before a challenge is dropped.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Role assigned when roles are optional and none is supplied.
pub const DEFAULT_ROLE: &str = "candidate";
