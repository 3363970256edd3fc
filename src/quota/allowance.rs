use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{de::IgnoredAny, Deserialize, Serialize};

pub const DEFAULT_ALLOWANCE: u32 = 10;
pub const WINDOW_HOURS: usize = 24;

/// Swipes left in the current window and the instant that window started.
///
/// Always serialized in the canonical `{"remaining", "lastReset"}` shape. Reading
/// also accepts the older shapes that carried `count` and `resetAt`.
///
/// A legacy `resetAt` is turned into `lastReset` by subtracting [WINDOW_HOURS],
/// whatever window the [crate::Tracker] evaluating the record is configured with.
/// Records written under a custom window therefore migrate with a 24 hour offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredAllowance")]
pub struct SwipeAllowance {
    pub remaining: u32,
    pub last_reset: DateTime<Utc>,
}

impl SwipeAllowance {
    pub fn new(remaining: u32, last_reset: DateTime<Utc>) -> Self {
        Self {
            remaining,
            last_reset,
        }
    }

    /// End of the window that started at `last_reset`.
    pub fn reset_at(&self, window: Duration) -> DateTime<Utc> {
        self.last_reset + window
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Rfc3339(DateTime<Utc>),
    Millis(i64),
    Unknown(IgnoredAny),
}

impl Timestamp {
    fn into_utc(self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Rfc3339(time) => Some(time),
            Timestamp::Millis(millis) => Utc.timestamp_millis_opt(millis).single(),
            Timestamp::Unknown(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Integer(i64),
    Float(f64),
    Text(String),
    Unknown(IgnoredAny),
}

impl Count {
    fn into_count(self) -> Option<u32> {
        match self {
            Count::Integer(count) => Some(count.clamp(0, u32::MAX as i64) as u32),
            Count::Float(count) => Self::from_float(count),
            Count::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Self::from_float),
            Count::Unknown(_) => None,
        }
    }

    fn from_float(count: f64) -> Option<u32> {
        count
            .is_finite()
            .then(|| count.trunc().clamp(0.0, u32::MAX as f64) as u32)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAllowance {
    remaining: Option<Count>,
    count: Option<Count>,
    last_reset: Option<Timestamp>,
    reset_at: Option<Timestamp>,
}

impl From<StoredAllowance> for SwipeAllowance {
    fn from(stored: StoredAllowance) -> Self {
        let remaining = stored
            .remaining
            .and_then(Count::into_count)
            .or_else(|| stored.count.and_then(Count::into_count))
            .unwrap_or(0);
        let last_reset = stored
            .last_reset
            .and_then(Timestamp::into_utc)
            .or_else(|| {
                stored
                    .reset_at
                    .and_then(Timestamp::into_utc)
                    .and_then(|reset_at| {
                        reset_at.checked_sub_signed(Duration::hours(WINDOW_HOURS as i64))
                    })
            })
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            remaining,
            last_reset,
        }
    }
}
