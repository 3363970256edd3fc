//! Rolling daily swipe allowance.
//!
//! Every operation is a pure transform over a caller supplied record and the
//! evaluation time. Nothing here is synchronised: a caller that reads a record,
//! consumes and saves it must serialize those steps itself, or go through a
//! [crate::datastore::Datastore] which does the read-evaluate-write atomically.

mod allowance;
mod user;

use chrono::{DateTime, Duration, Utc};
use essentials::debug;

pub use allowance::{SwipeAllowance, DEFAULT_ALLOWANCE, WINDOW_HOURS};
pub use user::User;

use crate::time::{Frequency, Time};

/// Outcome of [Tracker::consume].
#[derive(Debug, Clone, PartialEq)]
pub struct Consumption {
    pub allowed: bool,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tracker {
    quota: Frequency,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(Frequency::new(
            DEFAULT_ALLOWANCE as usize,
            Time::hours(WINDOW_HOURS),
        ))
    }
}

impl Tracker {
    pub fn new(quota: Frequency) -> Self {
        Self { quota }
    }

    pub fn allowance(&self) -> u32 {
        self.quota.amount.min(u32::MAX as usize) as u32
    }

    pub fn window(&self) -> Duration {
        self.quota.interval.to_duration()
    }

    /// Reset decision for a bare allowance. A missing allowance is treated as
    /// infinitely old and comes back full.
    pub fn refresh(&self, allowance: Option<SwipeAllowance>, now: DateTime<Utc>) -> SwipeAllowance {
        match allowance {
            Some(allowance) if now - allowance.last_reset < self.window() => SwipeAllowance {
                remaining: allowance.remaining.min(self.allowance()),
                ..allowance
            },
            _ => SwipeAllowance::new(self.allowance(), now),
        }
    }

    /// Reset check followed by one consumption attempt.
    pub fn evaluate_at(
        &self,
        allowance: Option<SwipeAllowance>,
        now: DateTime<Utc>,
    ) -> (bool, SwipeAllowance) {
        let allowance = self.refresh(allowance, now);
        match allowance.remaining.checked_sub(1) {
            Some(remaining) => (
                true,
                SwipeAllowance {
                    remaining,
                    ..allowance
                },
            ),
            None => (false, allowance),
        }
    }

    pub fn initialize(&self, user: User) -> User {
        self.initialize_at(user, Utc::now())
    }

    pub fn initialize_at(&self, mut user: User, now: DateTime<Utc>) -> User {
        if user.swipes.is_some() {
            return self.check_and_reset_at(user, now);
        }
        debug!(user = %user.id, remaining = self.allowance(), "Initialized swipe allowance");
        user.swipes = Some(SwipeAllowance::new(self.allowance(), now));
        user
    }

    pub fn check_and_reset(&self, user: User) -> User {
        self.check_and_reset_at(user, Utc::now())
    }

    pub fn check_and_reset_at(&self, mut user: User, now: DateTime<Utc>) -> User {
        let refreshed = self.refresh(user.swipes, now);
        if user.swipes.map(|swipes| swipes.last_reset) != Some(refreshed.last_reset) {
            debug!(user = %user.id, "Swipe allowance reset");
        }
        user.swipes = Some(refreshed);
        user
    }

    pub fn consume(&self, user: Option<User>) -> Consumption {
        self.consume_at(user, Utc::now())
    }

    pub fn consume_at(&self, user: Option<User>, now: DateTime<Utc>) -> Consumption {
        let Some(mut user) = user else {
            return Consumption {
                allowed: false,
                user: None,
            };
        };
        let (allowed, swipes) = self.evaluate_at(user.swipes, now);
        if !allowed {
            debug!(user = %user.id, "Swipe quota exhausted");
        }
        user.swipes = Some(swipes);
        Consumption {
            allowed,
            user: Some(user),
        }
    }

    pub fn remaining_count(&self, user: Option<&User>) -> u32 {
        self.remaining_count_at(user, Utc::now())
    }

    pub fn remaining_count_at(&self, user: Option<&User>, now: DateTime<Utc>) -> u32 {
        user.map_or(0, |user| self.refresh(user.swipes, now).remaining)
    }
}
