use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{cmd, Client, RedisError, Script};
use tokio::sync::RwLock;

/// Attempts allowed per RUT inside one window.
const THROTTLE_LIMIT: u64 = 10;
const THROTTLE_WINDOW_SECONDS: u64 = 60;

const FIXED_WINDOW: &str = r#"
    local current = redis.call("INCR", KEYS[1])
    if current == 1 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
    end
    return current
"#;

/// Shared connection used for throttling and health reporting. Every
/// operation degrades to a no-op while disconnected.
#[derive(Clone)]
pub(crate) struct RedisHandle {
    url: String,
    manager: Arc<RwLock<Option<ConnectionManager>>>,
}

#[derive(Debug, Clone)]
pub(crate) enum RedisHealth {
    Healthy,
    Disconnected,
    Unhealthy(String),
}

/// Authentication endpoints that are throttled per RUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Throttle {
    Login,
    Register,
}

impl Throttle {
    pub(crate) fn key(self, rut: &str) -> String {
        match self {
            Self::Login => format!("rl:login:{rut}"),
            Self::Register => format!("rl:register:{rut}"),
        }
    }
}

impl RedisHandle {
    pub(crate) fn new(url: String) -> Self {
        Self { url, manager: Arc::new(RwLock::new(None)) }
    }

    pub(crate) async fn connect(&self) -> Result<(), RedisError> {
        let client = Client::open(self.url.clone())?;
        let manager = ConnectionManager::new(client).await?;
        *self.manager.write().await = Some(manager);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        *self.manager.write().await = None;
    }

    async fn connection(&self) -> Option<ConnectionManager> {
        self.manager.read().await.clone()
    }

    pub(crate) async fn health(&self) -> RedisHealth {
        let Some(mut manager) = self.connection().await else {
            return RedisHealth::Disconnected;
        };

        match cmd("PING").query_async::<_, String>(&mut manager).await {
            Ok(_) => RedisHealth::Healthy,
            Err(err) => RedisHealth::Unhealthy(err.to_string()),
        }
    }

    /// Counts one attempt against `throttle` for `rut`. Returns `false` once
    /// the window is used up; Redis failures let the attempt through.
    pub(crate) async fn allow(&self, throttle: Throttle, rut: &str) -> bool {
        let key = throttle.key(rut);
        match self.hit(&key, THROTTLE_LIMIT, THROTTLE_WINDOW_SECONDS).await {
            Ok(allowed) => allowed,
            Err(err) => {
                tracing::warn!(error = %err, key = %key, "Rate limit check failed");
                true
            }
        }
    }

    /// Forgets previous attempts, e.g. after a successful login.
    pub(crate) async fn clear(&self, throttle: Throttle, rut: &str) {
        let Some(mut manager) = self.connection().await else {
            return;
        };

        let key = throttle.key(rut);
        if let Err(err) = cmd("DEL").arg(&key).query_async::<_, i64>(&mut manager).await {
            tracing::warn!(error = %err, key = %key, "Failed to clear rate limit");
        }
    }

    async fn hit(&self, key: &str, limit: u64, window_seconds: u64) -> Result<bool, RedisError> {
        let Some(mut manager) = self.connection().await else {
            return Ok(true);
        };

        let current: i64 = Script::new(FIXED_WINDOW)
            .key(key)
            .arg(window_seconds as i64)
            .invoke_async(&mut manager)
            .await?;

        Ok(current <= limit as i64)
    }
}
