//! Scheduler record domain model and parameters.
//!
//! A scheduler record is a one-shot trigger for one (rule, clan, event instance,
//! lead time). Its `triggered` flag is the single source of truth for "has this
//! reminder fired".

use chrono::{DateTime, Duration, Utc};

use crate::{error::AppError, model::reminder::ReminderKind, util::parse::parse_u64_from_string};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerRecord {
    pub id: i32,
    pub guild_id: u64,
    pub rule_id: i32,
    pub clan_tag: String,
    pub instance_key: String,
    pub kind: ReminderKind,
    pub lead_time: Duration,
    pub end_time: DateTime<Utc>,
    pub fire_at: DateTime<Utc>,
    pub triggered: bool,
    pub triggered_at: Option<DateTime<Utc>>,
    /// Inserted already triggered by the catch-up policy, never delivered
    pub skipped: bool,
    pub created_at: DateTime<Utc>,
}

impl SchedulerRecord {
    /// Converts an entity model to a scheduler record.
    ///
    /// # Returns
    /// - `Ok(SchedulerRecord)` - The converted record
    /// - `Err(AppError::Internal)` - Unknown kind or unparsable guild ID
    pub fn from_entity(entity: entity::reminder_scheduler::Model) -> Result<Self, AppError> {
        Ok(Self {
            id: entity.id,
            guild_id: parse_u64_from_string(entity.guild_id)?,
            rule_id: entity.rule_id,
            clan_tag: entity.clan_tag,
            instance_key: entity.instance_key,
            kind: entity.kind.parse()?,
            lead_time: Duration::seconds(entity.lead_time_secs),
            end_time: entity.end_time,
            fire_at: entity.fire_at,
            triggered: entity.triggered,
            triggered_at: entity.triggered_at,
            skipped: entity.skipped,
            created_at: entity.created_at,
        })
    }
}

/// Parameters for inserting a scheduler record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSchedulerRecordParam {
    pub guild_id: u64,
    pub rule_id: i32,
    pub clan_tag: String,
    pub instance_key: String,
    pub kind: ReminderKind,
    pub lead_time: Duration,
    pub end_time: DateTime<Utc>,
    pub fire_at: DateTime<Utc>,
    /// Insert as already skipped (triggered without delivery)
    pub skipped: bool,
}
