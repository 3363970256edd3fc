use crate::{time::Frequency, SwipeAllowance, Tracker};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use essentials::debug;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use super::{Datastore, RateLimit, Response};

#[derive(Debug, Default, Clone)]
pub struct InMemoryDatastore {
    data: Arc<Mutex<HashMap<String, SwipeAllowance>>>,
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn consume_at(
        &self,
        key: &str,
        quota: &Frequency,
        now: DateTime<Utc>,
    ) -> Result<Response> {
        let tracker = Tracker::new(*quota);
        let mut data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Failed to acquire lock for key: {}", key))?;
        let (allowed, allowance) = tracker.evaluate_at(data.get(key).copied(), now);
        data.insert(key.to_string(), allowance);
        let rate_limit = RateLimit::new(&tracker, &allowance);
        debug!(key, allowed, remaining = rate_limit.remaining, "Consumed swipe");
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
        let data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Failed to acquire lock for key: {}", key))?;
        let allowance = tracker.refresh(data.get(key).copied(), now);
        Ok(RateLimit::new(&tracker, &allowance))
    }
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stored allowance, exactly as persisted.
    pub fn get(&self, key: &str) -> Result<Option<SwipeAllowance>> {
        let data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Failed to acquire lock for key: {}", key))?;
        Ok(data.get(key).copied())
    }

    pub fn insert(&self, key: &str, allowance: SwipeAllowance) -> Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Failed to acquire lock for key: {}", key))?;
        data.insert(key.to_string(), allowance);
        Ok(())
    }
}
