use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{time::Frequency, SwipeAllowance, Tracker};

mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::InMemoryDatastore;
#[cfg(feature = "redis")]
pub use redis::RedisDatastore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Ok(RateLimit),
    /// Quota exhausted; carries the timestamp at which the window ends.
    Limited(usize),
}

impl Response {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Response::Ok(_))
    }
}

/// Single source of truth for swipe allowances, keyed by user.
///
/// Implementations run the reset check and the consumption as one atomic step per
/// key, so concurrent swipes of the same user can never overspend the quota.
#[async_trait]
pub trait Datastore {
    async fn consume_at(&self, key: &str, quota: &Frequency, now: DateTime<Utc>)
        -> Result<Response>;

    /// Allowance left after the reset check. The reset itself is not persisted.
    async fn remaining_at(
        &self,
        key: &str,
        quota: &Frequency,
        now: DateTime<Utc>,
    ) -> Result<RateLimit>;

    async fn consume(&self, key: &str, quota: &Frequency) -> Result<Response> {
        self.consume_at(key, quota, Utc::now()).await
    }

    async fn remaining(&self, key: &str, quota: &Frequency) -> Result<RateLimit> {
        self.remaining_at(key, quota, Utc::now()).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: usize,
    pub remaining: usize,
    pub reset: usize,
}

impl RateLimit {
    fn new(tracker: &Tracker, allowance: &SwipeAllowance) -> Self {
        Self {
            limit: tracker.allowance() as usize,
            remaining: allowance.remaining as usize,
            reset: allowance.reset_at(tracker.window()).timestamp().max(0) as usize,
        }
    }
}
