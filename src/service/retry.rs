//! Bounded in-memory retry list for retryable delivery failures.
//!
//! Entries live only as long as the process. A restart drops them, which leaves
//! their records triggered and undelivered, the same outcome as a crash between
//! claim and delivery.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::{config::RetryConfig, model::scheduler::SchedulerRecord};

/// A claimed record waiting for another delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryEntry {
    pub record: SchedulerRecord,
    /// Message parts still to post when earlier parts already went out; empty
    /// means the next attempt renders the message afresh
    pub remaining_parts: Vec<String>,
    /// Delivery attempts already made
    pub attempts: u32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: String,
}

/// Result of handing a failed delivery to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// Queued for another attempt at the given time
    Queued(DateTime<Utc>),
    /// The attempt cap was reached; the failure is final
    Exhausted,
    /// The queue is full; the failure is final
    Dropped,
}

pub struct RetryQueue {
    config: RetryConfig,
    entries: Mutex<VecDeque<RetryEntry>>,
}

impl RetryQueue {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Queues a record after a failed attempt unless its attempts are used up
    ///
    /// # Arguments
    /// - `record`: Claimed record whose delivery failed
    /// - `remaining_parts`: Parts not yet posted, empty when nothing went out
    /// - `attempts`: Attempts made so far, including the one that just failed
    /// - `error`: Failure description
    /// - `now`: Time of the failed attempt
    pub async fn schedule(
        &self,
        record: SchedulerRecord,
        remaining_parts: Vec<String>,
        attempts: u32,
        error: String,
        now: DateTime<Utc>,
    ) -> RetryOutcome {
        if attempts >= self.config.max_attempts {
            return RetryOutcome::Exhausted;
        }

        let mut entries = self.entries.lock().await;
        if entries.len() >= self.config.queue_capacity {
            return RetryOutcome::Dropped;
        }

        let jitter = Duration::milliseconds(rand::rng().random_range(0..1000));
        let next_attempt_at = now + backoff_delay(&self.config, attempts) + jitter;

        entries.push_back(RetryEntry {
            record,
            remaining_parts,
            attempts,
            next_attempt_at,
            last_error: error,
        });

        RetryOutcome::Queued(next_attempt_at)
    }

    /// Removes and returns every entry whose backoff has elapsed
    pub async fn take_ready(&self, now: DateTime<Utc>) -> Vec<RetryEntry> {
        let mut entries = self.entries.lock().await;

        let (ready, waiting): (Vec<_>, Vec<_>) = entries
            .drain(..)
            .partition(|entry| entry.next_attempt_at <= now);
        entries.extend(waiting);

        ready
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Backoff before the attempt following `attempts` failed ones, without jitter.
///
/// `base * 2^(attempts - 1)`, capped at the configured maximum.
pub fn backoff_delay(config: &RetryConfig, attempts: u32) -> Duration {
    let exponent = attempts.saturating_sub(1).min(31);
    let secs = config
        .base_delay_secs
        .saturating_mul(1u64 << exponent)
        .min(config.max_delay_secs);
    Duration::seconds(secs as i64)
}
