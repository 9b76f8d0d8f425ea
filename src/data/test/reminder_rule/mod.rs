use crate::{
    data::reminder_rule::ReminderRuleRepository,
    error::AppError,
    model::{
        clan::ClanRole,
        reminder::{
            CreateReminderRuleParam, DeliveryTarget, ReminderKind, RuleFilters,
            UpdateReminderRuleParam, WebhookTarget,
        },
    },
};
use chrono::Duration;
use sea_orm::EntityTrait;
use test_utils::{builder::TestBuilder, factory};

mod create;
mod delete;
mod get_by_channel;
mod get_enabled;
mod update;

fn create_param(guild_id: u64) -> CreateReminderRuleParam {
    CreateReminderRuleParam {
        guild_id,
        kind: ReminderKind::War,
        clan_tags: vec!["#2PP".to_string()],
        lead_times: vec![Duration::hours(1), Duration::minutes(15)],
        target: DeliveryTarget::channel(555),
        filters: RuleFilters::default(),
        message_template: "{clan} war ends {end_time}".to_string(),
        disabled: false,
    }
}
