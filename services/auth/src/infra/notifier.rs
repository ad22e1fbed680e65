use anyhow::Context as _;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpSettings;
use crate::domain::repository::Notifier;
use crate::domain::types::LoginCodeMessage;

/// Local dev notifier that logs the message instead of sending real email.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, message: &LoginCodeMessage) -> anyhow::Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject(),
            body = %message.body(),
            "login code email (log only)"
        );
        Ok(())
    }
}

/// Sends login codes over SMTP.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &SmtpSettings) -> anyhow::Result<Self> {
        let mut builder = if settings.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .with_context(|| format!("invalid SMTP relay {}", settings.host))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };
        builder = builder.port(settings.port);
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = settings
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("invalid SMTP_FROM address {}", settings.from))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl Notifier for SmtpNotifier {
    async fn send(&self, message: &LoginCodeMessage) -> anyhow::Result<()> {
        let to = message
            .to
            .parse::<Mailbox>()
            .with_context(|| format!("invalid recipient address {}", message.to))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body())
            .context("build login code email")?;

        self.transport
            .send(email)
            .await
            .context("deliver login code email")?;
        Ok(())
    }
}

/// Notifier selected at startup.
#[derive(Clone)]
pub enum NotifierBackend {
    Log(LogNotifier),
    Smtp(SmtpNotifier),
}

impl Notifier for NotifierBackend {
    async fn send(&self, message: &LoginCodeMessage) -> anyhow::Result<()> {
        match self {
            Self::Log(inner) => inner.send(message).await,
            Self::Smtp(inner) => inner.send(message).await,
        }
    }
}
