use passcode_auth::domain::repository::{ChallengeStore, Clock, Notifier};
use passcode_auth::domain::types::{IssuedChallenge, Verified};
use passcode_auth::error::AuthServiceError;
use passcode_auth::usecase::challenge::{Authenticator, IssueInput, VerifyInput};

pub const EMAIL: &str = "a@b.com";

pub async fn issue<S, N, C>(
    auth: &Authenticator<S, N, C>,
    identity: &str,
    role: &str,
) -> Result<IssuedChallenge, AuthServiceError>
where
    S: ChallengeStore,
    N: Notifier,
    C: Clock,
{
    auth.issue(IssueInput {
        identity: Some(identity.to_owned()),
        role: Some(role.to_owned()),
    })
    .await
}

pub async fn verify<S, N, C>(
    auth: &Authenticator<S, N, C>,
    identity: &str,
    code: &str,
) -> Result<Verified, AuthServiceError>
where
    S: ChallengeStore,
    N: Notifier,
    C: Clock,
{
    auth.verify(VerifyInput {
        identity: Some(identity.to_owned()),
        code: Some(code.to_owned()),
    })
    .await
}

/// A six-digit code guaranteed to differ from `code`.
pub fn wrong_code(code: &str) -> String {
    if code == "123456" {
        "654321".to_owned()
    } else {
        "123456".to_owned()
    }
}
