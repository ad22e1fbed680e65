use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Utc};
use deadpool_redis::{Connection, Pool};
use deadpool_redis::redis::{self, AsyncCommands};

use crate::domain::repository::ChallengeStore;
use crate::domain::types::{Challenge, Mutation};
use crate::error::AuthServiceError;

/// Attempts at an optimistic `WATCH`/`MULTI`/`EXEC` before giving up.
const MAX_TRANSACTION_RETRIES: usize = 8;

/// Redis-backed challenge store shared by every replica of the service.
///
/// Keys live for the challenge lifetime plus `grace_secs`, so an expired
/// challenge is still found (and reported as expired) for a while before Redis
/// evicts it on its own.
#[derive(Clone)]
pub struct RedisChallengeStore {
    pub pool: Pool,
    pub grace_secs: u64,
}

fn challenge_key(identity: &str) -> String {
    format!("otp_challenge:{identity}")
}

fn decode(raw: Option<Vec<u8>>) -> Result<Option<Challenge>, AuthServiceError> {
    raw.map(|bytes| serde_json::from_slice::<Challenge>(&bytes))
        .transpose()
        .context("decode stored challenge")
        .map_err(AuthServiceError::from)
}

fn encode(challenge: &Challenge) -> Result<Vec<u8>, AuthServiceError> {
    serde_json::to_vec(challenge)
        .context("encode challenge")
        .map_err(AuthServiceError::from)
}

/// One optimistic round. `Ok(None)` means `EXEC` was aborted by a concurrent write.
async fn transact<T, F>(
    conn: &mut Connection,
    key: &str,
    f: &mut F,
) -> Result<Option<T>, AuthServiceError>
where
    T: Send,
    F: FnMut(Option<&Challenge>) -> (Mutation, T) + Send,
{
    let (): () = redis::cmd("WATCH")
        .arg(key)
        .query_async(conn)
        .await
        .context("watch challenge")?;
    let raw: Option<Vec<u8>> = conn.get(key).await.context("load challenge")?;
    let current = decode(raw)?;

    let (mutation, out) = f(current.as_ref());

    let mut pipe = redis::pipe();
    pipe.atomic();
    match &mutation {
        Mutation::Keep => {
            let (): () = redis::cmd("UNWATCH")
                .query_async(conn)
                .await
                .context("unwatch challenge")?;
            return Ok(Some(out));
        }
        Mutation::Delete => {
            pipe.del(key);
        }
        Mutation::Replace(next) => {
            pipe.cmd("SET").arg(key).arg(encode(next)?).arg("KEEPTTL");
        }
    }

    // EXEC replies nil when the watched key changed underneath us.
    let committed: Option<redis::Value> = pipe
        .query_async(conn)
        .await
        .context("commit challenge update")?;
    Ok(committed.map(|_| out))
}

impl RedisChallengeStore {
    fn ttl_secs(&self, challenge: &Challenge) -> u64 {
        let lifetime = challenge.lifetime().num_seconds().max(1) as u64;
        lifetime + self.grace_secs
    }
}

impl ChallengeStore for RedisChallengeStore {
    async fn put(&self, challenge: &Challenge) -> Result<(), AuthServiceError> {
        let mut conn = self.pool.get().await.context("get redis connection")?;
        let key = challenge_key(&challenge.identity);
        let payload = encode(challenge)?;
        let (): () = conn
            .set_ex(&key, payload, self.ttl_secs(challenge))
            .await
            .context("store challenge")?;
        Ok(())
    }

    async fn modify<T, F>(&self, identity: &str, mut f: F) -> Result<T, AuthServiceError>
    where
        T: Send,
        F: FnMut(Option<&Challenge>) -> (Mutation, T) + Send,
    {
        let mut conn = self.pool.get().await.context("get redis connection")?;
        let key = challenge_key(identity);

        for _ in 0..MAX_TRANSACTION_RETRIES {
            match transact(&mut conn, &key, &mut f).await {
                Ok(Some(out)) => return Ok(out),
                Ok(None) => {
                    tracing::debug!("challenge transaction conflicted, retrying");
                }
                Err(e) => {
                    // The connection goes back to the pool; it must not keep watching.
                    let unwatched: redis::RedisResult<()> =
                        redis::cmd("UNWATCH").query_async(&mut conn).await;
                    if let Err(unwatch_err) = unwatched {
                        tracing::warn!(error = %unwatch_err, "failed to unwatch challenge");
                    }
                    return Err(e);
                }
            }
        }

        Err(AuthServiceError::Internal(anyhow!(
            "challenge kept changing during update"
        )))
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        // Key TTLs evict abandoned challenges.
        Ok(0)
    }

    async fn ping(&self) -> Result<(), AuthServiceError> {
        let mut conn = self.pool.get().await.context("get redis connection")?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("ping redis")?;
        Ok(())
    }
}
