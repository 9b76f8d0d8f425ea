use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde_json::json;

use crate::{
    error::AppError,
    model::reminder::{
        CreateReminderRuleParam, DeliveryTarget, ReminderRule, UpdateReminderRuleParam,
    },
};

pub struct ReminderRuleRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReminderRuleRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new reminder rule
    ///
    /// Parameters are stored as given; validation and tag normalization happen in
    /// `ReminderRuleService`.
    ///
    /// # Returns
    /// - `Ok(ReminderRule)`: The created rule
    /// - `Err(AppError::DbErr)`: Database error
    pub async fn create(&self, param: CreateReminderRuleParam) -> Result<ReminderRule, AppError> {
        let now = Utc::now();
        let (webhook_id, webhook_token, thread_id) = target_columns(&param.target);

        let model = entity::reminder_rule::ActiveModel {
            guild_id: ActiveValue::Set(param.guild_id.to_string()),
            kind: ActiveValue::Set(param.kind.as_str().to_string()),
            clan_tags: ActiveValue::Set(json!(param.clan_tags)),
            lead_times: ActiveValue::Set(lead_time_column(&param.lead_times)),
            channel_id: ActiveValue::Set(param.target.channel_id.to_string()),
            webhook_id: ActiveValue::Set(webhook_id),
            webhook_token: ActiveValue::Set(webhook_token),
            thread_id: ActiveValue::Set(thread_id),
            town_hall_min: ActiveValue::Set(param.filters.town_hall_min),
            town_hall_max: ActiveValue::Set(param.filters.town_hall_max),
            linked_only: ActiveValue::Set(param.filters.linked_only),
            roles: ActiveValue::Set(json!(param.filters.roles)),
            min_remaining_attacks: ActiveValue::Set(param.filters.min_remaining_attacks),
            message_template: ActiveValue::Set(param.message_template),
            disabled: ActiveValue::Set(param.disabled),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        ReminderRule::from_entity(model)
    }

    /// Replaces the editable fields of a reminder rule
    ///
    /// Scheduler records already materialized for in-flight events are not touched.
    ///
    /// # Returns
    /// - `Ok(Some(ReminderRule))`: The updated rule
    /// - `Ok(None)`: No rule with that ID
    /// - `Err(AppError)`: Database error
    pub async fn update(
        &self,
        param: UpdateReminderRuleParam,
    ) -> Result<Option<ReminderRule>, AppError> {
        let Some(existing) = entity::prelude::ReminderRule::find_by_id(param.id)
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let (webhook_id, webhook_token, thread_id) = target_columns(&param.target);

        let mut model: entity::reminder_rule::ActiveModel = existing.into();
        model.clan_tags = ActiveValue::Set(json!(param.clan_tags));
        model.lead_times = ActiveValue::Set(lead_time_column(&param.lead_times));
        model.channel_id = ActiveValue::Set(param.target.channel_id.to_string());
        model.webhook_id = ActiveValue::Set(webhook_id);
        model.webhook_token = ActiveValue::Set(webhook_token);
        model.thread_id = ActiveValue::Set(thread_id);
        model.town_hall_min = ActiveValue::Set(param.filters.town_hall_min);
        model.town_hall_max = ActiveValue::Set(param.filters.town_hall_max);
        model.linked_only = ActiveValue::Set(param.filters.linked_only);
        model.roles = ActiveValue::Set(json!(param.filters.roles));
        model.min_remaining_attacks = ActiveValue::Set(param.filters.min_remaining_attacks);
        model.message_template = ActiveValue::Set(param.message_template);
        model.disabled = ActiveValue::Set(param.disabled);
        model.updated_at = ActiveValue::Set(Utc::now());

        let updated = model.update(self.db).await?;

        Ok(Some(ReminderRule::from_entity(updated)?))
    }

    /// Deletes a reminder rule
    ///
    /// # Returns
    /// - `Ok(u64)`: Number of rules deleted (0 or 1)
    /// - `Err(DbErr)`: Database error
    pub async fn delete(&self, id: i32) -> Result<u64, DbErr> {
        let result = entity::prelude::ReminderRule::delete_by_id(id)
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Finds a reminder rule by ID
    ///
    /// # Returns
    /// - `Ok(Some(ReminderRule))`: Rule found
    /// - `Ok(None)`: Rule not found
    /// - `Err(AppError)`: Database error or undecodable stored rule
    pub async fn find_by_id(&self, id: i32) -> Result<Option<ReminderRule>, AppError> {
        entity::prelude::ReminderRule::find_by_id(id)
            .one(self.db)
            .await?
            .map(ReminderRule::from_entity)
            .transpose()
    }

    /// Gets every rule that is not disabled, ordered by ID
    ///
    /// Rows that cannot be decoded are logged and left out so one bad rule does not
    /// stop the materialization pass for every other guild.
    pub async fn get_enabled(&self) -> Result<Vec<ReminderRule>, DbErr> {
        let models = entity::prelude::ReminderRule::find()
            .filter(entity::reminder_rule::Column::Disabled.eq(false))
            .order_by_asc(entity::reminder_rule::Column::Id)
            .all(self.db)
            .await?;

        Ok(decode_all(models))
    }

    /// Gets all rules of a guild, ordered by ID
    pub async fn get_by_guild(&self, guild_id: u64) -> Result<Vec<ReminderRule>, DbErr> {
        let models = entity::prelude::ReminderRule::find()
            .filter(entity::reminder_rule::Column::GuildId.eq(guild_id.to_string()))
            .order_by_asc(entity::reminder_rule::Column::Id)
            .all(self.db)
            .await?;

        Ok(decode_all(models))
    }

    /// Gets rules posting into a channel, either directly or through a thread
    pub async fn get_by_channel(&self, channel_id: u64) -> Result<Vec<ReminderRule>, DbErr> {
        let channel_id = channel_id.to_string();
        let models = entity::prelude::ReminderRule::find()
            .filter(
                Condition::any()
                    .add(entity::reminder_rule::Column::ChannelId.eq(channel_id.as_str()))
                    .add(entity::reminder_rule::Column::ThreadId.eq(channel_id.as_str())),
            )
            .order_by_asc(entity::reminder_rule::Column::Id)
            .all(self.db)
            .await?;

        Ok(decode_all(models))
    }
}

fn decode_all(models: Vec<entity::reminder_rule::Model>) -> Vec<ReminderRule> {
    models
        .into_iter()
        .filter_map(|model| {
            let id = model.id;
            match ReminderRule::from_entity(model) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::error!("Skipping undecodable reminder rule {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

fn lead_time_column(lead_times: &[chrono::Duration]) -> serde_json::Value {
    json!(lead_times
        .iter()
        .map(|lead| lead.num_seconds())
        .collect::<Vec<_>>())
}

fn target_columns(target: &DeliveryTarget) -> (Option<String>, Option<String>, Option<String>) {
    (
        target.webhook.as_ref().map(|w| w.id.to_string()),
        target.webhook.as_ref().map(|w| w.token.clone()),
        target.thread_id.map(|id| id.to_string()),
    )
}
