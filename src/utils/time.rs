use chrono::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn seconds(&self, amount: usize) -> usize {
        match self {
            TimeUnit::Seconds => amount,
            TimeUnit::Minutes => amount * 60,
            TimeUnit::Hours => amount * 3600,
            TimeUnit::Days => amount * 86400,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Time {
    pub amount: usize,
    pub unit: TimeUnit,
}

impl Time {
    pub fn new(amount: usize, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn hours(amount: usize) -> Self {
        Self::new(amount, TimeUnit::Hours)
    }

    /// Exact length of the interval.
    pub fn to_duration(&self) -> Duration {
        Duration::seconds(self.unit.seconds(self.amount) as i64)
    }
}

/// `amount` actions allowed per `interval`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frequency {
    pub amount: usize,
    pub interval: Time,
}

impl Frequency {
    pub fn new(amount: usize, interval: Time) -> Self {
        Self { amount, interval }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_to_duration() {
        assert_eq!(Time::hours(24).to_duration(), Duration::hours(24));
        assert_eq!(
            Time::new(90, TimeUnit::Minutes).to_duration(),
            Duration::minutes(90)
        );
        assert_eq!(
            Time::new(2, TimeUnit::Days).to_duration(),
            Duration::hours(48)
        );
        assert_eq!(Time::new(45, TimeUnit::Seconds).to_duration(), Duration::seconds(45));
    }
}
