//! Poll-and-claim dispatch of due reminders.
//!
//! A tick first re-attempts retry entries whose backoff elapsed, then claims due
//! records with a conditional update and hands each claimed record to a bounded
//! pool of delivery tasks. The claim is the single source of truth for "has this
//! fired"; a record is never claimed twice, whatever happens to its delivery.
//!
//! A tick never waits on delivery I/O. Delivery tasks are spawned as soon as their
//! record is claimed and wait for a pool slot themselves.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{Mutex, Semaphore},
    task::JoinSet,
};

use crate::{
    config::EngineConfig,
    data::{
        reminder_rule::ReminderRuleRepository, rule_health::RuleHealthRepository,
        scheduler::SchedulerRepository,
    },
    error::{delivery::DeliveryError, AppError},
    model::{health::HealthStatus, scheduler::SchedulerRecord},
    service::{
        delivery::{split_message, DeliverySink, MESSAGE_LIMIT},
        render::ReminderRenderer,
        retry::{RetryOutcome, RetryQueue},
    },
};

/// Counters of one dispatch tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Retry entries handed back to the delivery pool
    pub retried: usize,
    /// Due records returned by the poll
    pub due: usize,
    /// Due records this worker won the claim for
    pub claimed: usize,
}

/// Final state of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Nobody left to remind; nothing was sent
    NothingToSend,
    /// Rule deleted, disabled or broken since the record was created
    Dropped,
    Retrying(DateTime<Utc>),
    /// Retryable failure with no attempts left, or the retry queue was full
    Failed(String),
    /// Terminal failure; the rule was marked broken
    Broken(String),
}

#[derive(Clone)]
pub struct ReminderDispatcher {
    db: DatabaseConnection,
    renderer: ReminderRenderer,
    sink: Arc<dyn DeliverySink>,
    retry: Arc<RetryQueue>,
    permits: Arc<Semaphore>,
    tasks: Arc<Mutex<JoinSet<()>>>,
    /// Held for the whole of a tick so shutdown can wait for it
    tick: Arc<Mutex<()>>,
    stopped: Arc<AtomicBool>,
    batch_size: u64,
}

impl ReminderDispatcher {
    pub fn new(
        db: DatabaseConnection,
        renderer: ReminderRenderer,
        sink: Arc<dyn DeliverySink>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            db,
            renderer,
            sink,
            retry: Arc::new(RetryQueue::new(config.retry)),
            permits: Arc::new(Semaphore::new(config.delivery_concurrency.max(1))),
            tasks: Arc::new(Mutex::new(JoinSet::new())),
            tick: Arc::new(Mutex::new(())),
            stopped: Arc::new(AtomicBool::new(false)),
            batch_size: config.dispatch_batch_size,
        }
    }

    /// Runs one dispatch tick
    ///
    /// Claims every due record of the batch and returns once each claimed record has
    /// a delivery task; the deliveries themselves may still be queued for a pool
    /// slot or running. Ticks of one dispatcher never overlap. After
    /// [`shutdown`](Self::shutdown) a tick does nothing.
    ///
    /// # Returns
    /// - `Ok(DispatchSummary)`: Tick counters
    /// - `Err(AppError)`: Due records could not be polled or claimed
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<DispatchSummary, AppError> {
        let _tick = self.tick.lock().await;

        let mut summary = DispatchSummary::default();
        if self.stopped.load(Ordering::SeqCst) {
            return Ok(summary);
        }

        self.reap_finished().await;

        for entry in self.retry.take_ready(now).await {
            tracing::debug!(
                "Retrying reminder {} (attempt {}) after: {}",
                entry.record.id,
                entry.attempts + 1,
                entry.last_error
            );
            summary.retried += 1;
            self.spawn_delivery(entry.record, entry.attempts + 1, entry.remaining_parts, now)
                .await;
        }

        let repo = SchedulerRepository::new(&self.db);
        let due = repo.get_due(now, self.batch_size).await?;
        summary.due = due.len();

        for record in due {
            if !repo.claim(record.id, now).await? {
                continue;
            }
            summary.claimed += 1;
            self.spawn_delivery(record, 1, Vec::new(), now).await;
        }

        Ok(summary)
    }

    /// Waits for in-flight deliveries to finish
    ///
    /// Waits for a running tick first so its deliveries are included. Deliveries
    /// still running when `timeout` elapses are aborted.
    ///
    /// # Returns
    /// - `true`: Every delivery finished in time
    /// - `false`: The timeout elapsed and the remaining deliveries were aborted
    pub async fn drain(&self, timeout: Duration) -> bool {
        let mut tasks = {
            let _tick = self.tick.lock().await;
            std::mem::take(&mut *self.tasks.lock().await)
        };

        let finished = tokio::time::timeout(timeout, async {
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    tracing::error!("Reminder delivery task failed: {}", e);
                }
            }
        })
        .await
        .is_ok();

        if !finished {
            tracing::warn!(
                "Aborting {} reminder deliveries still running after {:?}",
                tasks.len(),
                timeout
            );
            tasks.abort_all();
        }

        finished
    }

    /// Stops claiming new records and drains in-flight deliveries
    ///
    /// Queued retries are not attempted again.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.stopped.store(true, Ordering::SeqCst);

        let pending = self.retry.len().await;
        if pending > 0 {
            tracing::warn!("Dropping {} queued delivery retries", pending);
        }

        self.drain(timeout).await
    }

    /// Number of records waiting for a retry.
    pub async fn pending_retries(&self) -> usize {
        self.retry.len().await
    }

    async fn spawn_delivery(
        &self,
        record: SchedulerRecord,
        attempt: u32,
        remaining_parts: Vec<String>,
        now: DateTime<Utc>,
    ) {
        let permits = self.permits.clone();
        let dispatcher = self.clone();

        self.tasks.lock().await.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!("Delivery pool closed, dropping reminder {}: {}", record.id, e);
                    return;
                }
            };
            dispatcher
                .deliver_parts(record, attempt, remaining_parts, now)
                .await;
        });
    }

    async fn reap_finished(&self) {
        let mut tasks = self.tasks.lock().await;
        while let Some(result) = tasks.try_join_next() {
            if let Err(e) = result {
                tracing::error!("Reminder delivery task failed: {}", e);
            }
        }
    }

    /// Renders and delivers one claimed record, then records the outcome
    ///
    /// Never returns an error: every failure ends up in the logs, the retry queue
    /// or rule health.
    pub async fn deliver(
        &self,
        record: SchedulerRecord,
        attempt: u32,
        now: DateTime<Utc>,
    ) -> DeliveryOutcome {
        self.deliver_parts(record, attempt, Vec::new(), now).await
    }

    /// Delivers a record, resuming from `remaining_parts` when a previous attempt
    /// already posted the first parts of its message.
    async fn deliver_parts(
        &self,
        record: SchedulerRecord,
        attempt: u32,
        remaining_parts: Vec<String>,
        now: DateTime<Utc>,
    ) -> DeliveryOutcome {
        let health = RuleHealthRepository::new(&self.db);

        let rule = match ReminderRuleRepository::new(&self.db)
            .find_by_id(record.rule_id)
            .await
        {
            Ok(Some(rule)) => rule,
            Ok(None) => {
                tracing::info!(
                    "Dropping reminder {}: rule {} no longer exists",
                    record.id,
                    record.rule_id
                );
                return DeliveryOutcome::Dropped;
            }
            Err(e) => {
                return self
                    .retry_later(record, remaining_parts, attempt, e.to_string(), now)
                    .await
            }
        };

        if rule.disabled {
            tracing::info!(
                "Dropping reminder {}: rule {} is disabled",
                record.id,
                rule.id
            );
            return DeliveryOutcome::Dropped;
        }

        match health.find_by_rule(rule.id).await {
            Ok(Some(h)) if h.status == HealthStatus::Broken => {
                tracing::info!(
                    "Dropping reminder {}: rule {} has a broken target ({})",
                    record.id,
                    rule.id,
                    h.last_error
                );
                return DeliveryOutcome::Dropped;
            }
            Ok(_) => {}
            Err(e) => {
                return self
                    .retry_later(record, remaining_parts, attempt, e.to_string(), now)
                    .await
            }
        }

        if attempt > 1 && now >= record.end_time {
            tracing::info!(
                "Dropping retry of reminder {}: event {} already ended",
                record.id,
                record.instance_key
            );
            return DeliveryOutcome::Dropped;
        }

        let resumed = !remaining_parts.is_empty();
        let parts = if resumed {
            remaining_parts
        } else {
            match self.renderer.render(&rule, &record, now).await {
                Ok(Some(content)) => split_message(&content, MESSAGE_LIMIT),
                Ok(None) => {
                    tracing::debug!(
                        "Reminder {} for rule {} clan {} has nobody to remind",
                        record.id,
                        rule.id,
                        record.clan_tag
                    );
                    return DeliveryOutcome::NothingToSend;
                }
                Err(e) => {
                    return self
                        .retry_later(record, Vec::new(), attempt, e.to_string(), now)
                        .await
                }
            }
        };

        for (index, part) in parts.iter().enumerate() {
            match self.sink.deliver(&rule.target, part).await {
                Ok(()) => {}
                Err(DeliveryError::Terminal(reason)) => {
                    tracing::error!(
                        "Reminder {} for rule {} failed permanently, marking rule broken: {}",
                        record.id,
                        rule.id,
                        reason
                    );
                    self.record_health(rule.id, HealthStatus::Broken, &reason)
                        .await;
                    return DeliveryOutcome::Broken(reason);
                }
                Err(DeliveryError::Retryable(reason)) => {
                    // Parts already posted are not sent again
                    let remaining = if resumed || index > 0 {
                        parts[index..].to_vec()
                    } else {
                        Vec::new()
                    };
                    return self
                        .retry_later(record, remaining, attempt, reason, now)
                        .await;
                }
            }
        }

        tracing::info!(
            "Delivered {} reminder {} for rule {} clan {} ({}m before end)",
            record.kind,
            record.id,
            rule.id,
            record.clan_tag,
            record.lead_time.num_minutes()
        );
        if let Err(e) = health.clear(rule.id).await {
            tracing::error!("Failed to clear health of rule {}: {}", rule.id, e);
        }
        DeliveryOutcome::Delivered
    }

    async fn retry_later(
        &self,
        record: SchedulerRecord,
        remaining_parts: Vec<String>,
        attempt: u32,
        reason: String,
        now: DateTime<Utc>,
    ) -> DeliveryOutcome {
        let (record_id, rule_id) = (record.id, record.rule_id);

        match self
            .retry
            .schedule(record, remaining_parts, attempt, reason.clone(), now)
            .await
        {
            RetryOutcome::Queued(at) => {
                tracing::warn!(
                    "Reminder {} attempt {} failed, retrying at {}: {}",
                    record_id,
                    attempt,
                    at,
                    reason
                );
                DeliveryOutcome::Retrying(at)
            }
            RetryOutcome::Exhausted => {
                tracing::error!(
                    "Reminder {} failed after {} attempts: {}",
                    record_id,
                    attempt,
                    reason
                );
                self.record_health(rule_id, HealthStatus::Failing, &reason)
                    .await;
                DeliveryOutcome::Failed(reason)
            }
            RetryOutcome::Dropped => {
                tracing::error!(
                    "Retry queue full, giving up on reminder {}: {}",
                    record_id,
                    reason
                );
                self.record_health(rule_id, HealthStatus::Failing, &reason)
                    .await;
                DeliveryOutcome::Failed(reason)
            }
        }
    }

    async fn record_health(&self, rule_id: i32, status: HealthStatus, reason: &str) {
        if let Err(e) = RuleHealthRepository::new(&self.db)
            .record_failure(rule_id, status, reason)
            .await
        {
            tracing::error!("Failed to record health of rule {}: {}", rule_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::RetryConfig,
        model::clan::{ClanWar, WarMember, WarState},
        service::{delivery::MockDeliverySink, game_data::MockGameDataClient},
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_utils::{builder::TestBuilder, factory};

    use crate::model::reminder::DeliveryTarget;

    const DRAIN: Duration = Duration::from_secs(5);

    fn end_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 11, 0, 0).unwrap()
    }

    fn game(end_time: DateTime<Utc>) -> MockGameDataClient {
        let mut game = MockGameDataClient::new();
        game.expect_current_war().returning(move |tag| {
            Ok(Some(ClanWar {
                state: WarState::InWar,
                clan_tag: tag.to_string(),
                clan_name: "Reddit Zulu".to_string(),
                opponent_tag: "#8QU".to_string(),
                opponent_name: "Rival".to_string(),
                preparation_start_time: end_time - chrono::Duration::hours(47),
                start_time: end_time - chrono::Duration::hours(24),
                end_time,
                attacks_per_member: 2,
                members: vec![WarMember {
                    tag: "#LQ2".to_string(),
                    name: "Alice".to_string(),
                    town_hall_level: 15,
                    attacks_used: 0,
                }],
            }))
        });
        game
    }

    fn dispatcher(
        db: &DatabaseConnection,
        game: MockGameDataClient,
        sink: MockDeliverySink,
    ) -> ReminderDispatcher {
        dispatcher_with(db, game, Arc::new(sink), 8)
    }

    fn dispatcher_with(
        db: &DatabaseConnection,
        game: MockGameDataClient,
        sink: Arc<dyn DeliverySink>,
        delivery_concurrency: usize,
    ) -> ReminderDispatcher {
        let config = EngineConfig {
            delivery_concurrency,
            retry: RetryConfig {
                max_attempts: 3,
                base_delay_secs: 30,
                max_delay_secs: 600,
                queue_capacity: 10,
            },
            ..Default::default()
        };
        ReminderDispatcher::new(
            db.clone(),
            ReminderRenderer::new(db.clone(), Arc::new(game)),
            sink,
            &config,
        )
    }

    /// Sink that takes `delay` for every message.
    struct SlowSink {
        delay: Duration,
        delivered: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DeliverySink for SlowSink {
        async fn deliver(
            &self,
            _target: &DeliveryTarget,
            _content: &str,
        ) -> Result<(), DeliveryError> {
            tokio::time::sleep(self.delay).await;
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Tests the 60m/15m scenario dispatched at T-14m.
    ///
    /// The 60m record was already delivered and another clan's record is not due yet.
    ///
    /// Expected: only the 15m record is claimed and delivered once
    #[tokio::test]
    async fn delivers_only_the_due_record() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_reminder_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let end = end_time();
        let rule = factory::reminder_rule::ReminderRuleFactory::new(db)
            .clan_tags(["#2PP", "#8QU"])
            .lead_times_minutes([60, 15])
            .build()
            .await?;
        let delivered_60 = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .lead_time_minutes(60)
            .triggered(true)
            .build()
            .await?;
        let due_15 = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .lead_time_minutes(15)
            .build()
            .await?;
        let other_clan = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .clan_tag("#8QU")
            .instance_key("war:other")
            .end_time(end + chrono::Duration::hours(6))
            .lead_time_minutes(15)
            .build()
            .await?;

        let mut sink = MockDeliverySink::new();
        sink.expect_deliver()
            .times(1)
            .withf(|_, content| content.contains("Alice (2 left)"))
            .returning(|_, _| Ok(()));

        let dispatcher = dispatcher(db, game(end), sink);
        let summary = dispatcher
            .run_once(end - chrono::Duration::minutes(14))
            .await?;
        assert!(dispatcher.drain(DRAIN).await);

        assert_eq!(summary.due, 1);
        assert_eq!(summary.claimed, 1);

        let repo = SchedulerRepository::new(db);
        assert!(repo.find_by_id(due_15.id).await?.unwrap().triggered);
        assert!(repo.find_by_id(delivered_60.id).await?.unwrap().triggered);
        assert!(!repo.find_by_id(other_clan.id).await?.unwrap().triggered);

        Ok(())
    }

    /// Tests two dispatchers polling the same store.
    ///
    /// Expected: the record is delivered exactly once
    #[tokio::test]
    async fn competing_dispatchers_deliver_once() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_reminder_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let end = end_time();
        let rule = factory::create_rule(db).await?;
        factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .lead_time_minutes(15)
            .build()
            .await?;

        let deliveries = Arc::new(AtomicUsize::new(0));
        let sink_for = |counter: Arc<AtomicUsize>| {
            let mut sink = MockDeliverySink::new();
            sink.expect_deliver().returning(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            sink
        };

        let a = dispatcher(db, game(end), sink_for(deliveries.clone()));
        let b = dispatcher(db, game(end), sink_for(deliveries.clone()));
        let now = end - chrono::Duration::minutes(10);

        let (ra, rb) = tokio::join!(a.run_once(now), b.run_once(now));
        assert_eq!(ra?.claimed + rb?.claimed, 1);
        a.drain(DRAIN).await;
        b.drain(DRAIN).await;

        assert_eq!(deliveries.load(Ordering::SeqCst), 1);

        Ok(())
    }

    /// Tests that a record is not claimed before its fire time.
    ///
    /// Expected: nothing delivered one second early, delivered once due
    #[tokio::test]
    async fn does_not_fire_early() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_reminder_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let end = end_time();
        let rule = factory::create_rule(db).await?;
        let record = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .lead_time_minutes(15)
            .build()
            .await?;

        let mut sink = MockDeliverySink::new();
        sink.expect_deliver().times(1).returning(|_, _| Ok(()));
        let dispatcher = dispatcher(db, game(end), sink);

        let early = dispatcher
            .run_once(record.fire_at - chrono::Duration::seconds(1))
            .await?;
        assert_eq!(early.claimed, 0);

        let on_time = dispatcher.run_once(record.fire_at).await?;
        assert_eq!(on_time.claimed, 1);
        dispatcher.drain(DRAIN).await;

        Ok(())
    }

    /// Tests retryable failures up to the attempt cap.
    ///
    /// Expected: three attempts, then the rule is marked failing and nothing is
    /// retried again
    #[tokio::test]
    async fn retries_until_cap_then_gives_up() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_reminder_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let end = end_time();
        let rule = factory::create_rule(db).await?;
        let record = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .lead_time_minutes(240)
            .build()
            .await?;

        let mut sink = MockDeliverySink::new();
        sink.expect_deliver()
            .times(3)
            .returning(|_, _| Err(DeliveryError::from_status(503, "unavailable")));
        let dispatcher = dispatcher(db, game(end), sink);

        let mut now = record.fire_at;
        for _ in 0..4 {
            dispatcher.run_once(now).await?;
            dispatcher.drain(DRAIN).await;
            now += chrono::Duration::minutes(30);
        }

        assert_eq!(dispatcher.pending_retries().await, 0);
        let health = RuleHealthRepository::new(db)
            .find_by_rule(rule.id)
            .await?
            .unwrap();
        assert_eq!(health.status, HealthStatus::Failing);
        assert_eq!(health.consecutive_failures, 1);
        assert!(
            SchedulerRepository::new(db)
                .find_by_id(record.id)
                .await?
                .unwrap()
                .triggered
        );

        Ok(())
    }

    /// Tests a terminal failure.
    ///
    /// Expected: a single attempt, the rule marked broken, no retry queued
    #[tokio::test]
    async fn terminal_failure_short_circuits() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_reminder_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let end = end_time();
        let rule = factory::create_rule(db).await?;
        let record = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .lead_time_minutes(60)
            .build()
            .await?;

        let mut sink = MockDeliverySink::new();
        sink.expect_deliver()
            .times(1)
            .returning(|_, _| Err(DeliveryError::from_status(404, "Unknown Channel")));
        let dispatcher = dispatcher(db, game(end), sink);

        dispatcher.run_once(record.fire_at).await?;
        dispatcher.drain(DRAIN).await;
        dispatcher
            .run_once(record.fire_at + chrono::Duration::minutes(30))
            .await?;
        dispatcher.drain(DRAIN).await;

        assert_eq!(dispatcher.pending_retries().await, 0);
        let health = RuleHealthRepository::new(db)
            .find_by_rule(rule.id)
            .await?
            .unwrap();
        assert_eq!(health.status, HealthStatus::Broken);

        Ok(())
    }

    /// Tests a claimed record whose rule was disabled after materialization.
    ///
    /// Expected: dropped without delivery
    #[tokio::test]
    async fn drops_records_of_disabled_rules() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_reminder_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let end = end_time();
        let rule = factory::reminder_rule::ReminderRuleFactory::new(db)
            .disabled(true)
            .build()
            .await?;
        let record = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .build()
            .await?;

        let mut sink = MockDeliverySink::new();
        sink.expect_deliver().never();
        let dispatcher = dispatcher(db, game(end), sink);

        let record = SchedulerRepository::new(db)
            .find_by_id(record.id)
            .await?
            .unwrap();
        let outcome = dispatcher.deliver(record, 1, end).await;

        assert_eq!(outcome, DeliveryOutcome::Dropped);

        Ok(())
    }

    /// Tests a tick with more due records than delivery slots and a slow sink.
    ///
    /// Expected: the tick claims every record without waiting for deliveries, which
    /// all complete on drain
    #[tokio::test]
    async fn tick_does_not_wait_for_slow_deliveries() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_reminder_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let end = end_time();
        let rule = factory::reminder_rule::ReminderRuleFactory::new(db)
            .lead_times_minutes([60, 30, 15])
            .build()
            .await?;
        for minutes in [60, 30, 15] {
            factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
                .end_time(end)
                .lead_time_minutes(minutes)
                .build()
                .await?;
        }

        let delay = Duration::from_secs(1);
        let delivered = Arc::new(AtomicUsize::new(0));
        let sink = SlowSink {
            delay,
            delivered: delivered.clone(),
        };
        let dispatcher = dispatcher_with(db, game(end), Arc::new(sink), 1);

        let started = std::time::Instant::now();
        let summary = dispatcher
            .run_once(end - chrono::Duration::minutes(10))
            .await?;
        assert!(started.elapsed() < delay);
        assert_eq!(summary.claimed, 3);

        assert!(dispatcher.drain(DRAIN).await);
        assert_eq!(delivered.load(Ordering::SeqCst), 3);

        Ok(())
    }

    /// Tests a two-part message whose second part fails once.
    ///
    /// Expected: the retry posts only the second part; the first is sent once
    #[tokio::test]
    async fn retry_resumes_after_posted_parts() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_reminder_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let end = end_time();
        let rule = factory::reminder_rule::ReminderRuleFactory::new(db)
            .message_template("x".repeat(1990))
            .build()
            .await?;
        let record = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .lead_time_minutes(60)
            .build()
            .await?;

        let sent = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
        let mut sink = MockDeliverySink::new();
        let log = sent.clone();
        sink.expect_deliver().times(3).returning(move |_, content| {
            let mut log = log.lock().unwrap();
            log.push(content.to_string());
            if log.len() == 2 {
                Err(DeliveryError::from_status(503, "unavailable"))
            } else {
                Ok(())
            }
        });
        let dispatcher = dispatcher(db, game(end), sink);

        dispatcher.run_once(record.fire_at).await?;
        dispatcher.drain(DRAIN).await;
        assert_eq!(dispatcher.pending_retries().await, 1);

        dispatcher
            .run_once(record.fire_at + chrono::Duration::minutes(30))
            .await?;
        dispatcher.drain(DRAIN).await;

        assert_eq!(dispatcher.pending_retries().await, 0);
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].starts_with('x'));
        assert!(sent[1].contains("Alice (2 left)"));
        assert_eq!(sent[2], sent[1]);

        Ok(())
    }

    /// Tests shutdown racing a tick, then a tick after shutdown.
    ///
    /// Expected: the racing tick's delivery completes before shutdown returns and
    /// later ticks claim nothing
    #[tokio::test]
    async fn shutdown_waits_for_running_tick() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_reminder_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let end = end_time();
        let rule = factory::reminder_rule::ReminderRuleFactory::new(db)
            .lead_times_minutes([60, 15])
            .build()
            .await?;
        factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .lead_time_minutes(60)
            .build()
            .await?;
        let later = factory::scheduler_record::SchedulerRecordFactory::new(db, &rule)
            .end_time(end)
            .lead_time_minutes(15)
            .build()
            .await?;

        let deliveries = Arc::new(AtomicUsize::new(0));
        let counter = deliveries.clone();
        let mut sink = MockDeliverySink::new();
        sink.expect_deliver().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let dispatcher = dispatcher(db, game(end), sink);

        let (summary, drained) = tokio::join!(
            dispatcher.run_once(end - chrono::Duration::minutes(30)),
            dispatcher.shutdown(DRAIN)
        );
        assert!(drained);
        assert_eq!(deliveries.load(Ordering::SeqCst), summary?.claimed);

        let after = dispatcher
            .run_once(end - chrono::Duration::minutes(10))
            .await?;
        assert_eq!(after.claimed, 0);
        assert!(
            !SchedulerRepository::new(db)
                .find_by_id(later.id)
                .await?
                .unwrap()
                .triggered
        );

        Ok(())
    }
}
