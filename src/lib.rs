//! Daily swipe quota of a card-matching application.
//!
//! The core is [Tracker], a pure transform over a [User] record: it resets the
//! allowance once its window has elapsed and consumes one swipe at a time.
//! Callers that persist records themselves use it directly (see [LocalStore]);
//! callers that need a single source of truth across devices go through a
//! [datastore::Datastore], which applies the same transform atomically per user.
//!
//! # Example usage
//!
//! ```
//! use swipe_quota::{Tracker, User};
//!
//! let tracker = Tracker::default();
//! let user = tracker.initialize(User::new("u-1"));
//! assert_eq!(tracker.remaining_count(Some(&user)), 10);
//!
//! let swipe = tracker.consume(Some(user));
//! assert!(swipe.allowed);
//! assert_eq!(tracker.remaining_count(swipe.user.as_ref()), 9);
//! ```
pub mod config;
pub mod datastore;
pub(crate) mod quota;
pub mod store;
pub(crate) mod utils;

pub use datastore::{Datastore, InMemoryDatastore};
#[cfg(feature = "redis")]
pub use datastore::RedisDatastore;
pub use quota::{Consumption, SwipeAllowance, Tracker, User, DEFAULT_ALLOWANCE, WINDOW_HOURS};
pub use store::LocalStore;
pub use utils::time;
