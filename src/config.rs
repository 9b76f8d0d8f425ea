use std::str::FromStr;

use crate::error::{config::ConfigError, AppError};

const DEFAULT_CLASH_API_URL: &str = "https://api.clashofclans.com/v1";
const DEFAULT_MATERIALIZE_SCHEDULE: &str = "0 * * * * *";
const DEFAULT_DISPATCH_SCHEDULE: &str = "*/15 * * * * *";

/// What the materializer does with lead times already in the past when an event
/// instance is first observed (e.g. the bot started mid-event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatchUpPolicy {
    /// Insert past lead times already triggered, without delivery.
    #[default]
    Skip,
    /// Leave the most recent past lead time untriggered so it fires on the next
    /// dispatch tick; older past lead times are skipped.
    Fire,
}

impl FromStr for CatchUpPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(CatchUpPolicy::Skip),
            "fire" => Ok(CatchUpPolicy::Fire),
            other => Err(format!("expected 'skip' or 'fire', got '{}'", other)),
        }
    }
}

/// Retry settings for retryable delivery failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total delivery attempts per record, including the first one
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
    /// Entries beyond this are dropped and logged
    pub queue_capacity: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 30,
            max_delay_secs: 600,
            queue_capacity: 1000,
        }
    }
}

/// Tunables for the materializer and dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub materialize_schedule: String,
    pub dispatch_schedule: String,
    pub dispatch_batch_size: u64,
    pub delivery_concurrency: usize,
    pub catch_up_policy: CatchUpPolicy,
    pub retry: RetryConfig,
    pub shutdown_grace_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            materialize_schedule: DEFAULT_MATERIALIZE_SCHEDULE.to_string(),
            dispatch_schedule: DEFAULT_DISPATCH_SCHEDULE.to_string(),
            dispatch_batch_size: 100,
            delivery_concurrency: 8,
            catch_up_policy: CatchUpPolicy::Skip,
            retry: RetryConfig::default(),
            shutdown_grace_secs: 10,
        }
    }
}

pub struct Config {
    pub database_url: String,

    pub discord_bot_token: String,

    pub clash_api_token: String,
    pub clash_api_url: String,

    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = EngineConfig::default();

        let engine = EngineConfig {
            materialize_schedule: optional_var("MATERIALIZE_SCHEDULE")
                .unwrap_or(defaults.materialize_schedule),
            dispatch_schedule: optional_var("DISPATCH_SCHEDULE")
                .unwrap_or(defaults.dispatch_schedule),
            dispatch_batch_size: parse_var("DISPATCH_BATCH_SIZE", defaults.dispatch_batch_size)?,
            delivery_concurrency: parse_var(
                "DELIVERY_CONCURRENCY",
                defaults.delivery_concurrency,
            )?,
            catch_up_policy: parse_var("CATCH_UP_POLICY", defaults.catch_up_policy)?,
            retry: RetryConfig {
                max_attempts: parse_var("RETRY_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
                base_delay_secs: parse_var(
                    "RETRY_BASE_DELAY_SECS",
                    defaults.retry.base_delay_secs,
                )?,
                max_delay_secs: parse_var("RETRY_MAX_DELAY_SECS", defaults.retry.max_delay_secs)?,
                queue_capacity: parse_var("RETRY_QUEUE_CAPACITY", defaults.retry.queue_capacity)?,
            },
            shutdown_grace_secs: parse_var("SHUTDOWN_GRACE_SECS", defaults.shutdown_grace_secs)?,
        };

        if engine.delivery_concurrency == 0 {
            return Err(ConfigError::InvalidEnvVar {
                name: "DELIVERY_CONCURRENCY".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if engine.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar {
                name: "RETRY_MAX_ATTEMPTS".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        Ok(Self {
            database_url: required_var("DATABASE_URL")?,
            discord_bot_token: required_var("DISCORD_BOT_TOKEN")?,
            clash_api_token: required_var("CLASH_API_TOKEN")?,
            clash_api_url: optional_var("CLASH_API_URL")
                .unwrap_or_else(|| DEFAULT_CLASH_API_URL.to_string()),
            engine,
        })
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_var(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            }),
    }
}
