//! Scheduler record factory for creating test trigger entities.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating scheduler records for an existing rule.
///
/// Defaults to a due, untriggered record so dispatch tests can claim it right away.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::scheduler_record::SchedulerRecordFactory;
///
/// let record = SchedulerRecordFactory::new(&db, &rule)
///     .lead_time_minutes(15)
///     .fire_at(Utc::now() + Duration::minutes(5))
///     .build()
///     .await?;
/// ```
pub struct SchedulerRecordFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    rule_id: i32,
    clan_tag: String,
    instance_key: String,
    kind: String,
    lead_time_secs: i64,
    end_time: DateTime<Utc>,
    fire_at: DateTime<Utc>,
    triggered: bool,
    skipped: bool,
}

impl<'a> SchedulerRecordFactory<'a> {
    /// Creates a new SchedulerRecordFactory with default values.
    ///
    /// Defaults:
    /// - guild, kind and first clan tag copied from the rule
    /// - instance_key: `"war:test"`
    /// - lead time: 15 minutes, ending 15 minutes from now, so `fire_at` is now
    /// - untriggered
    ///
    /// # Arguments
    /// - `db` - Database connection for inserting the entity
    /// - `rule` - Rule the record belongs to
    ///
    /// # Returns
    /// - `SchedulerRecordFactory` - New factory instance with defaults
    pub fn new(db: &'a DatabaseConnection, rule: &entity::reminder_rule::Model) -> Self {
        let clan_tag = rule
            .clan_tags
            .as_array()
            .and_then(|tags| tags.first())
            .and_then(|tag| tag.as_str())
            .unwrap_or("#2PP")
            .to_string();
        let now = Utc::now();

        Self {
            db,
            guild_id: rule.guild_id.clone(),
            rule_id: rule.id,
            clan_tag,
            instance_key: format!("{}:test", rule.kind),
            kind: rule.kind.clone(),
            lead_time_secs: 900,
            end_time: now + Duration::minutes(15),
            fire_at: now,
            triggered: false,
            skipped: false,
        }
    }

    pub fn clan_tag(mut self, clan_tag: impl Into<String>) -> Self {
        self.clan_tag = clan_tag.into();
        self
    }

    pub fn instance_key(mut self, instance_key: impl Into<String>) -> Self {
        self.instance_key = instance_key.into();
        self
    }

    /// Sets the lead time and moves `fire_at` to `end_time - lead_time`.
    pub fn lead_time_minutes(mut self, minutes: i64) -> Self {
        self.lead_time_secs = minutes * 60;
        self.fire_at = self.end_time - Duration::minutes(minutes);
        self
    }

    /// Sets the event end and moves `fire_at` to `end_time - lead_time`.
    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = end_time;
        self.fire_at = end_time - Duration::seconds(self.lead_time_secs);
        self
    }

    pub fn fire_at(mut self, fire_at: DateTime<Utc>) -> Self {
        self.fire_at = fire_at;
        self
    }

    pub fn triggered(mut self, triggered: bool) -> Self {
        self.triggered = triggered;
        self
    }

    pub fn skipped(mut self, skipped: bool) -> Self {
        self.skipped = skipped;
        self.triggered = self.triggered || skipped;
        self
    }

    /// Builds and inserts the scheduler record entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::reminder_scheduler::Model)` - Created record entity
    /// - `Err(DbErr)` - Database error during insert, including unique index conflicts
    pub async fn build(self) -> Result<entity::reminder_scheduler::Model, DbErr> {
        let now = Utc::now();

        entity::reminder_scheduler::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(self.guild_id),
            rule_id: ActiveValue::Set(self.rule_id),
            clan_tag: ActiveValue::Set(self.clan_tag),
            instance_key: ActiveValue::Set(self.instance_key),
            kind: ActiveValue::Set(self.kind),
            lead_time_secs: ActiveValue::Set(self.lead_time_secs),
            end_time: ActiveValue::Set(self.end_time),
            fire_at: ActiveValue::Set(self.fire_at),
            triggered: ActiveValue::Set(self.triggered),
            triggered_at: ActiveValue::Set(self.triggered.then_some(now)),
            skipped: ActiveValue::Set(self.skipped),
            created_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a due, untriggered record for the rule's first clan.
///
/// # Arguments
/// - `db` - Database connection
/// - `rule` - Rule the record belongs to
///
/// # Returns
/// - `Ok(entity::reminder_scheduler::Model)` - Created record entity
/// - `Err(DbErr)` - Database error during insert
pub async fn create_record(
    db: &DatabaseConnection,
    rule: &entity::reminder_rule::Model,
) -> Result<entity::reminder_scheduler::Model, DbErr> {
    SchedulerRecordFactory::new(db, rule).build().await
}
