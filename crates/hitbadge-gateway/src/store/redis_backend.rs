//! Redis counter backend.
//!
//! A supervisor task owns the connection lifecycle:
//! - initial connect with capped linear backoff (`min(attempt * 50ms, max)`)
//! - `PING` health check on a fixed interval, flipping `ConnectionState` down/up
//! - exits once the backend is dropped
//!
//! Commands go through a `ConnectionManager` carrying connect/response
//! timeouts and a bounded retry count, so a dead server turns into an error
//! in bounded time instead of a hung request.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, Pipeline, RedisError};
use tokio::sync::RwLock;

use hitbadge_core::badge::Counts;
use hitbadge_core::error::{HitBadgeError, Result};

use super::{ConnectionState, CounterBackend};
use crate::config::StoreSection;

pub struct RedisBackend {
    conn: RwLock<Option<ConnectionManager>>,
    state: Arc<ConnectionState>,
}

impl RedisBackend {
    /// Open the client and start the supervisor. Must run inside a tokio runtime.
    pub fn spawn(cfg: &StoreSection, state: Arc<ConnectionState>) -> Result<Arc<Self>> {
        let client = Client::open(cfg.uri.as_str())
            .map_err(|e| HitBadgeError::BadRequest(format!("store.uri invalid: {e}")))?;

        let backend = Arc::new(Self {
            conn: RwLock::new(None),
            state,
        });

        tokio::spawn(supervise(Arc::downgrade(&backend), client, cfg.clone()));
        Ok(backend)
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| HitBadgeError::StoreUnavailable("redis not connected".into()))
    }

    fn on_error(&self, e: RedisError) -> HitBadgeError {
        if is_connection_error(&e) && self.state.mark_down() {
            tracing::warn!(error = %e, "redis connection error");
        }
        HitBadgeError::StoreUnavailable(format!("redis: {e}"))
    }
}

fn is_connection_error(e: &RedisError) -> bool {
    e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
}

#[async_trait]
impl CounterBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn incr_pair(&self, daily_key: &str, total_key: &str, ttl_secs: u64) -> Result<Counts> {
        let mut conn = self.connection().await?;
        let ttl = i64::try_from(ttl_secs)
            .map_err(|_| HitBadgeError::Internal(format!("ttl out of range: {ttl_secs}")))?;

        let (daily, total): (u64, u64) = incr_pipeline(daily_key, total_key, ttl)
            .query_async(&mut conn)
            .await
            .map_err(|e| self.on_error(e))?;

        Ok(Counts::new(daily, total))
    }

    async fn get_pair(&self, daily_key: &str, total_key: &str) -> Result<Counts> {
        let mut conn = self.connection().await?;

        let (daily, total): (Option<u64>, Option<u64>) = read_pipeline(daily_key, total_key)
            .query_async(&mut conn)
            .await
            .map_err(|e| self.on_error(e))?;

        Ok(Counts::new(daily.unwrap_or(0), total.unwrap_or(0)))
    }
}

/// `MULTI; INCR daily; INCR total; EXPIRE daily ttl; EXEC`. Replies decode
/// as `(daily, total)`; the EXPIRE reply is ignored.
pub fn incr_pipeline(daily_key: &str, total_key: &str, ttl_secs: i64) -> Pipeline {
    let mut p = redis::pipe();
    p.atomic()
        .incr(daily_key, 1u64)
        .incr(total_key, 1u64)
        .expire(daily_key, ttl_secs)
        .ignore();
    p
}

/// `GET daily; GET total`, no transaction and no writes.
pub fn read_pipeline(daily_key: &str, total_key: &str) -> Pipeline {
    let mut p = redis::pipe();
    p.get(daily_key).get(total_key);
    p
}

/// Delay before reconnect attempt `attempt` (1-based).
pub fn reconnect_delay(attempt: u64, max_delay_ms: u64) -> Duration {
    Duration::from_millis(attempt.saturating_mul(50).min(max_delay_ms))
}

fn manager_config(cfg: &StoreSection) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_connection_timeout(Duration::from_millis(cfg.connect_timeout_ms))
        .set_response_timeout(Duration::from_millis(cfg.response_timeout_ms))
        .set_number_of_retries(cfg.max_retries)
        .set_factor(50)
        .set_max_delay(cfg.retry_max_delay_ms)
}

async fn supervise(backend: Weak<RedisBackend>, client: Client, cfg: StoreSection) {
    let connect_timeout = Duration::from_millis(cfg.connect_timeout_ms);
    let mut attempt: u64 = 0;

    let mut conn = loop {
        attempt += 1;
        let res = tokio::time::timeout(
            connect_timeout,
            ConnectionManager::new_with_config(client.clone(), manager_config(&cfg)),
        )
        .await;

        let Some(b) = backend.upgrade() else { return };
        match res {
            Ok(Ok(m)) => {
                *b.conn.write().await = Some(m.clone());
                b.state.mark_up();
                tracing::info!(attempt, "connected to redis");
                break m;
            }
            Ok(Err(e)) => {
                b.state.mark_down();
                tracing::warn!(error = %e, attempt, "redis connect failed");
            }
            Err(_) => {
                b.state.mark_down();
                tracing::warn!(attempt, timeout_ms = cfg.connect_timeout_ms, "redis connect timed out");
            }
        }
        drop(b);
        tokio::time::sleep(reconnect_delay(attempt, cfg.retry_max_delay_ms)).await;
    };

    let mut tick = tokio::time::interval(Duration::from_millis(cfg.health_interval_ms));
    tick.tick().await;

    loop {
        tick.tick().await;
        let res: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;

        let Some(b) = backend.upgrade() else {
            tracing::debug!("redis backend dropped, supervisor exiting");
            return;
        };
        match res {
            Ok(_) => {
                if !b.state.mark_up() {
                    tracing::info!("redis connection restored");
                }
            }
            Err(e) => {
                if b.state.mark_down() {
                    tracing::warn!(error = %e, "redis connection closed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Command names and arguments of a packed pipeline, in order.
    fn packed(p: &Pipeline) -> String {
        String::from_utf8_lossy(&p.get_packed_pipeline()).into_owned()
    }

    fn commands(p: &Pipeline) -> Vec<String> {
        packed(p)
            .split("\r\n")
            .filter(|l| !l.is_empty() && !l.starts_with('*') && !l.starts_with('$'))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn incr_pipeline_is_one_transaction() {
        let p = incr_pipeline("hits:daily:p:2024-05-01", "hits:total:p", 172_800);
        assert_eq!(
            commands(&p),
            [
                "MULTI",
                "INCR",
                "hits:daily:p:2024-05-01",
                "1",
                "INCR",
                "hits:total:p",
                "1",
                "EXPIRE",
                "hits:daily:p:2024-05-01",
                "172800",
                "EXEC",
            ]
        );
    }

    #[test]
    fn expiry_only_on_daily_key() {
        let p = incr_pipeline("d", "t", 172_800);
        let cmds = commands(&p);
        let at = cmds.iter().position(|c| c == "EXPIRE").unwrap();
        assert_eq!(cmds[at + 1], "d");
        assert_eq!(cmds.iter().filter(|c| *c == "EXPIRE").count(), 1);
    }

    #[test]
    fn read_pipeline_never_writes() {
        let p = read_pipeline("hits:daily:p:2024-05-01", "hits:total:p");
        assert_eq!(
            commands(&p),
            ["GET", "hits:daily:p:2024-05-01", "GET", "hits:total:p"]
        );
    }

    #[test]
    fn reconnect_delay_is_linear_then_capped() {
        assert_eq!(reconnect_delay(1, 2000), Duration::from_millis(50));
        assert_eq!(reconnect_delay(10, 2000), Duration::from_millis(500));
        assert_eq!(reconnect_delay(40, 2000), Duration::from_millis(2000));
        assert_eq!(reconnect_delay(u64::MAX, 2000), Duration::from_millis(2000));
    }
}
