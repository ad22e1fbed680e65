use anyhow::{bail, ensure};
use chrono::Duration;
use serde::Deserialize;

use passcode_core::config::Config;

use crate::domain::types::{
    DEFAULT_CODE_TTL_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_ROLE, NotifyPolicy,
};
use crate::usecase::challenge::AuthenticatorSettings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
    #[default]
    Log,
    Smtp,
}

/// Auth service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    #[serde(default = "default_port")]
    pub auth_port: u16,
    /// Origins allowed to call the API from a browser, comma separated.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    /// `memory` (default) or `redis`. Env var: `OTP_STORE`.
    #[serde(default)]
    pub otp_store: StoreKind,
    /// Redis connection URL, required when `OTP_STORE=redis`.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Extra seconds a Redis key outlives its challenge.
    #[serde(default = "default_redis_grace")]
    pub otp_redis_grace_secs: u64,

    /// Challenge lifetime in seconds (default 600).
    #[serde(default = "default_code_ttl")]
    pub otp_code_ttl_secs: u64,
    /// Wrong codes tolerated per challenge; `0` means unlimited.
    #[serde(default = "default_max_attempts")]
    pub otp_max_attempts: u32,
    /// Reject `request-code` calls that carry no role.
    #[serde(default = "default_true")]
    pub otp_require_role: bool,
    /// Role used when roles are optional and none is given.
    #[serde(default = "default_role")]
    pub otp_default_role: String,
    /// If non-empty, the only roles a caller may claim.
    #[serde(default)]
    pub otp_allowed_roles: Vec<String>,
    /// `best_effort` (default) or `strict`.
    #[serde(default)]
    pub otp_notify_policy: NotifyPolicy,
    /// Seconds between expired-challenge sweeps; `0` disables the sweep.
    #[serde(default = "default_sweep_interval")]
    pub otp_sweep_interval_secs: u64,
    /// Product name shown in the login email.
    #[serde(default = "default_app_name")]
    pub otp_app_name: String,

    /// `log` (default) or `smtp`. Env var: `OTP_NOTIFIER`.
    #[serde(default)]
    pub otp_notifier: NotifierKind,
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_from: Option<String>,
    /// Use STARTTLS (default). Disable only for local mail catchers.
    #[serde(default = "default_true")]
    pub smtp_tls: bool,
}

impl Config for AuthConfig {}

/// SMTP connection details, present only when `OTP_NOTIFIER=smtp`.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub tls: bool,
}

/// Upper bound on `OTP_CODE_TTL_SECS`.
const MAX_CODE_TTL_SECS: u64 = 86_400;

fn default_port() -> u16 {
    3112
}

fn default_redis_grace() -> u64 {
    3600
}

fn default_code_ttl() -> u64 {
    DEFAULT_CODE_TTL_SECS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_true() -> bool {
    true
}

fn default_role() -> String {
    DEFAULT_ROLE.to_owned()
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_app_name() -> String {
    "JobBoard".to_owned()
}

fn default_smtp_port() -> u16 {
    587
}

/// Comma-separated env lists arrive as `[""]` when the variable is set but empty.
fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect()
}

impl AuthConfig {
    /// Reject combinations that would only fail later at request time.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.otp_code_ttl_secs > 0, "OTP_CODE_TTL_SECS must be positive");
        ensure!(
            self.otp_code_ttl_secs <= MAX_CODE_TTL_SECS,
            "OTP_CODE_TTL_SECS must not exceed one day"
        );
        if self.otp_store == StoreKind::Redis && self.redis_url.is_none() {
            bail!("REDIS_URL is required when OTP_STORE=redis");
        }
        if !self.otp_require_role && self.otp_default_role.trim().is_empty() {
            bail!("OTP_DEFAULT_ROLE must be set when OTP_REQUIRE_ROLE=false");
        }
        if self.otp_notifier == NotifierKind::Smtp {
            self.smtp()?;
        }
        Ok(())
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        non_empty(&self.cors_allowed_origins)
    }

    pub fn authenticator_settings(&self) -> AuthenticatorSettings {
        let ttl_secs = self.otp_code_ttl_secs.min(MAX_CODE_TTL_SECS) as i64;
        AuthenticatorSettings {
            code_ttl: Duration::seconds(ttl_secs),
            max_attempts: self.otp_max_attempts,
            require_role: self.otp_require_role,
            default_role: self.otp_default_role.trim().to_owned(),
            allowed_roles: non_empty(&self.otp_allowed_roles),
            notify_policy: self.otp_notify_policy,
            app_name: self.otp_app_name.clone(),
        }
    }

    pub fn sweep_interval(&self) -> Option<std::time::Duration> {
        (self.otp_sweep_interval_secs > 0)
            .then(|| std::time::Duration::from_secs(self.otp_sweep_interval_secs))
    }

    pub fn smtp(&self) -> anyhow::Result<SmtpSettings> {
        let Some(host) = self.smtp_host.clone() else {
            bail!("SMTP_HOST is required when OTP_NOTIFIER=smtp");
        };
        let Some(from) = self.smtp_from.clone() else {
            bail!("SMTP_FROM is required when OTP_NOTIFIER=smtp");
        };
        Ok(SmtpSettings {
            host,
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            from,
            tls: self.smtp_tls,
        })
    }
}
