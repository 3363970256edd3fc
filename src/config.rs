use std::path::PathBuf;

use structopt::StructOpt;

use crate::{
    store::LocalStore,
    time::{Frequency, Time},
    Tracker,
};

#[derive(Debug, StructOpt)]
#[structopt(name = "swipe-quota", about = "Daily swipe allowance of a user record")]
pub struct Config {
    /// JSON file holding the user record
    #[structopt(long, env = "SWIPE_STORE", default_value = "swipe-quota.json", parse(from_os_str))]
    pub store: PathBuf,

    /// Key of the user record inside the store
    #[structopt(long, env = "SWIPE_KEY", default_value = "swipe-quota.user")]
    pub key: String,

    /// Swipes allowed per window
    #[structopt(long, env = "SWIPE_ALLOWANCE", default_value = "10")]
    pub allowance: usize,

    /// Length of the allowance window in hours
    #[structopt(long, env = "SWIPE_WINDOW_HOURS", default_value = "24")]
    pub window_hours: usize,

    /// Keep allowances in Redis instead of the local record
    #[cfg(feature = "redis")]
    #[structopt(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Create the user record, or run the reset check on an existing one
    Init {
        #[structopt(long)]
        id: String,
    },
    /// Print the number of swipes left
    Status,
    /// Consume one swipe; exits with 2 when the quota is exhausted
    Swipe,
    /// Rewrite a legacy stored record in the current shape
    Migrate,
}

impl Config {
    pub fn quota(&self) -> Frequency {
        Frequency::new(self.allowance, Time::hours(self.window_hours))
    }

    pub fn tracker(&self) -> Tracker {
        Tracker::new(self.quota())
    }

    pub fn local_store(&self) -> LocalStore {
        LocalStore::with_key(&self.store, &self.key)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::DEFAULT_KEY;

    #[test]
    fn test_defaults_match_tracker() {
        let config = Config::from_iter_safe(["swipe-quota", "status"]).unwrap();
        assert_eq!(config.tracker(), Tracker::default());
        assert_eq!(config.key, DEFAULT_KEY);
        assert_eq!(config.store, PathBuf::from("swipe-quota.json"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_iter_safe([
            "swipe-quota",
            "--allowance",
            "3",
            "--window-hours",
            "1",
            "--store",
            "/tmp/other.json",
            "init",
            "--id",
            "u-1",
        ])
        .unwrap();
        assert_eq!(config.quota(), Frequency::new(3, Time::hours(1)));
        assert_eq!(config.store, PathBuf::from("/tmp/other.json"));
        assert!(matches!(config.command, Command::Init { ref id } if id == "u-1"));
    }
}
