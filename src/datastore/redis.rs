use anyhow::{Context, Result};
use async_trait::async_trait;
use bb8_redis::{bb8::Pool, redis, RedisConnectionManager};
use chrono::{DateTime, TimeZone, Utc};
use essentials::debug;

use crate::{time::Frequency, SwipeAllowance, Tracker};

use super::{Datastore, RateLimit, Response};

/// Reset check and optional consumption over the hash `{remaining, last_reset}`.
/// Mirrors [Tracker::evaluate_at]; Redis runs the whole script atomically.
const EVALUATE: &str = r"
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local amount = tonumber(ARGV[3])
local consume = ARGV[4] == '1'
local remaining = tonumber(redis.call('HGET', KEYS[1], 'remaining'))
local last_reset = tonumber(redis.call('HGET', KEYS[1], 'last_reset'))
if remaining == nil or last_reset == nil or now - last_reset >= window then
  remaining = amount
  last_reset = now
elseif remaining > amount then
  remaining = amount
end
local allowed = 0
if consume and remaining > 0 then
  remaining = remaining - 1
  allowed = 1
end
if consume then
  redis.call('HSET', KEYS[1], 'remaining', remaining, 'last_reset', last_reset)
end
return {allowed, remaining, last_reset}
";

pub struct RedisDatastore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisDatastore {
    pub fn new(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    async fn evaluate(
        &self,
        key: &str,
        tracker: &Tracker,
        now: DateTime<Utc>,
        consume: bool,
    ) -> Result<(bool, SwipeAllowance)> {
        let mut conn = self.pool.get().await.with_context(|| {
            format!("Failed to get connection from Redis pool for key: {}", key)
        })?;
        let (allowed, remaining, last_reset): (i64, i64, i64) = redis::cmd("EVAL")
            .arg(EVALUATE)
            .arg(1)
            .arg(key)
            .arg(now.timestamp_millis())
            .arg(tracker.window().num_milliseconds())
            .arg(tracker.allowance())
            .arg(if consume { 1 } else { 0 })
            .query_async(&mut *conn)
            .await
            .with_context(|| format!("Failed to evaluate swipe allowance for key: {}", key))?;
        let last_reset = Utc
            .timestamp_millis_opt(last_reset)
            .single()
            .with_context(|| format!("Invalid last reset {} for key: {}", last_reset, key))?;
        debug!(key, allowed, remaining, "Evaluated swipe allowance");
        Ok((
            allowed == 1,
            SwipeAllowance::new(remaining.max(0) as u32, last_reset),
        ))
    }
}

#[async_trait]
impl Datastore for RedisDatastore {
    async fn consume_at(
        &self,
        key: &str,
        quota: &Frequency,
        now: DateTime<Utc>,
    ) -> Result<Response> {
        let tracker = Tracker::new(*quota);
        let (allowed, allowance) = self.evaluate(key, &tracker, now, true).await?;
        let rate_limit = RateLimit::new(&tracker, &allowance);
        Ok(if allowed {
            Response::Ok(rate_limit)
        } else {
            Response::Limited(rate_limit.reset)
        })
    }

    async fn remaining_at(
        &self,
        key: &str,
        quota: &Frequency,
        now: DateTime<Utc>,
    ) -> Result<RateLimit> {
        let tracker = Tracker::new(*quota);
        let (_, allowance) = self.evaluate(key, &tracker, now, false).await?;
        Ok(RateLimit::new(&tracker, &allowance))
    }
}
