use std::process::ExitCode;

use anyhow::Result;
use essentials::{info, warn};
use structopt::StructOpt;
use swipe_quota::{
    config::{Command, Config},
    User,
};

const EXHAUSTED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    essentials::install();
    let config = Config::from_args();
    dispatch(&config).await
}

#[cfg(feature = "redis")]
async fn dispatch(config: &Config) -> Result<ExitCode> {
    match config.redis_url.as_deref() {
        Some(url) => remote::run(config, url).await,
        None => run(config),
    }
}

#[cfg(not(feature = "redis"))]
async fn dispatch(config: &Config) -> Result<ExitCode> {
    run(config)
}

fn run(config: &Config) -> Result<ExitCode> {
    let tracker = config.tracker();
    let store = config.local_store();
    match &config.command {
        Command::Init { id } => {
            let user = match store.load()? {
                Some(user) if &user.id == id => user,
                Some(user) => {
                    warn!(stored = %user.id, id = %id, "Replacing stored user record");
                    User::new(id.as_str())
                }
                None => User::new(id.as_str()),
            };
            let user = tracker.initialize(user);
            store.save(&user)?;
            println!("{}", user.swipes.map_or(0, |swipes| swipes.remaining));
        }
        Command::Status => {
            let user = store.load()?;
            println!("{}", tracker.remaining_count(user.as_ref()));
        }
        Command::Swipe => {
            let swipe = tracker.consume(store.load()?);
            if let Some(user) = swipe.user.as_ref() {
                store.save(user)?;
            }
            let remaining = swipe
                .user
                .as_ref()
                .and_then(|user| user.swipes)
                .map_or(0, |swipes| swipes.remaining);
            println!("{}", remaining);
            if !swipe.allowed {
                info!("Swipe quota exhausted");
                return Ok(ExitCode::from(EXHAUSTED));
            }
        }
        Command::Migrate => {
            if store.migrate()? {
                println!("migrated");
            } else {
                println!("up to date");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "redis")]
mod remote {
    use std::process::ExitCode;

    use anyhow::{Context, Result};
    use bb8_redis::{bb8, RedisConnectionManager};
    use essentials::info;
    use swipe_quota::{
        config::{Command, Config},
        datastore::Response,
        Datastore, RedisDatastore,
    };

    use super::EXHAUSTED;

    /// Allowances live in Redis under the user id; the local record only names the user.
    pub async fn run(config: &Config, url: &str) -> Result<ExitCode> {
        let manager = RedisConnectionManager::new(url)
            .with_context(|| format!("Invalid Redis URL: {}", url))?;
        let pool = bb8::Pool::builder()
            .build(manager)
            .await
            .context("Failed to build Redis pool")?;
        let datastore = RedisDatastore::new(pool);
        let quota = config.quota();
        let user = config.local_store().load()?;
        match (&config.command, user) {
            (Command::Status, Some(user)) => {
                println!("{}", datastore.remaining(&user.id, &quota).await?.remaining);
            }
            (Command::Swipe, Some(user)) => match datastore.consume(&user.id, &quota).await? {
                Response::Ok(rate_limit) => println!("{}", rate_limit.remaining),
                Response::Limited(reset) => {
                    info!(reset, "Swipe quota exhausted");
                    println!("0");
                    return Ok(ExitCode::from(EXHAUSTED));
                }
            },
            (Command::Status, None) => println!("0"),
            (Command::Swipe, None) => {
                println!("0");
                return Ok(ExitCode::from(EXHAUSTED));
            }
            _ => return super::run(config),
        }
        Ok(ExitCode::SUCCESS)
    }
}
