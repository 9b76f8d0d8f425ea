use crate::{
    data::scheduler::SchedulerRepository,
    error::AppError,
    model::{reminder::ReminderKind, scheduler::CreateSchedulerRecordParam},
};
use chrono::{DateTime, Duration, Utc};
use test_utils::{builder::TestBuilder, factory};

mod claim;
mod create_instance;
mod get_due;

fn create_param(
    rule: &entity::reminder_rule::Model,
    lead_time: Duration,
    end_time: DateTime<Utc>,
) -> CreateSchedulerRecordParam {
    CreateSchedulerRecordParam {
        guild_id: rule.guild_id.parse().unwrap(),
        rule_id: rule.id,
        clan_tag: "#2PP".to_string(),
        instance_key: "war:20261016T120000.000Z".to_string(),
        kind: ReminderKind::War,
        lead_time,
        end_time,
        fire_at: end_time - lead_time,
        skipped: false,
    }
}
