use std::sync::{Arc, Mutex};

use passcode_auth::domain::repository::Notifier;
use passcode_auth::domain::types::LoginCodeMessage;

/// Captures every message instead of sending it. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<LoginCodeMessage>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<LoginCodeMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Code from the most recent message. Panics if nothing was sent.
    pub fn last_code(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|m| m.code.clone())
            .expect("no login code was sent")
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, message: &LoginCodeMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Notifier whose every delivery fails.
#[derive(Clone, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    async fn send(&self, _message: &LoginCodeMessage) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("mail relay unavailable"))
    }
}
