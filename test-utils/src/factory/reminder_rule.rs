//! Reminder rule factory for creating test rule entities.

use crate::factory::helpers::next_snowflake;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};
use serde_json::json;

/// Factory for creating test reminder rules with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::reminder_rule::ReminderRuleFactory;
///
/// let rule = ReminderRuleFactory::new(&db)
///     .kind("war")
///     .lead_times_minutes([60, 15])
///     .build()
///     .await?;
/// ```
pub struct ReminderRuleFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    kind: String,
    clan_tags: Vec<String>,
    lead_time_secs: Vec<i64>,
    channel_id: String,
    webhook: Option<(String, String)>,
    thread_id: Option<String>,
    town_hall_min: Option<i32>,
    town_hall_max: Option<i32>,
    linked_only: bool,
    roles: Vec<String>,
    min_remaining_attacks: Option<i32>,
    message_template: String,
    disabled: bool,
}

impl<'a> ReminderRuleFactory<'a> {
    /// Creates a new ReminderRuleFactory with default values.
    ///
    /// Defaults:
    /// - guild_id / channel_id: unique snowflakes
    /// - kind: `"war"`
    /// - clan_tags: `["#2PP"]`
    /// - lead_times: 60 and 15 minutes
    /// - message_template: `"{clan} {kind} ends {end_time}"`
    /// - no webhook, thread, or filters; enabled
    ///
    /// # Arguments
    /// - `db` - Database connection for inserting the entity
    ///
    /// # Returns
    /// - `ReminderRuleFactory` - New factory instance with defaults
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            guild_id: next_snowflake(),
            kind: "war".to_string(),
            clan_tags: vec!["#2PP".to_string()],
            lead_time_secs: vec![3600, 900],
            channel_id: next_snowflake(),
            webhook: None,
            thread_id: None,
            town_hall_min: None,
            town_hall_max: None,
            linked_only: false,
            roles: Vec::new(),
            min_remaining_attacks: None,
            message_template: "{clan} {kind} ends {end_time}".to_string(),
            disabled: false,
        }
    }

    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = guild_id.into();
        self
    }

    /// Sets the stored kind value (`war`, `raid` or `clan_games`).
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn clan_tags<I, S>(mut self, clan_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clan_tags = clan_tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the lead times in minutes.
    pub fn lead_times_minutes(mut self, minutes: impl IntoIterator<Item = i64>) -> Self {
        self.lead_time_secs = minutes.into_iter().map(|m| m * 60).collect();
        self
    }

    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    pub fn webhook(mut self, id: impl Into<String>, token: impl Into<String>) -> Self {
        self.webhook = Some((id.into(), token.into()));
        self
    }

    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn town_hall_range(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.town_hall_min = min;
        self.town_hall_max = max;
        self
    }

    pub fn linked_only(mut self, linked_only: bool) -> Self {
        self.linked_only = linked_only;
        self
    }

    /// Sets the allowed roles using game API role names (`member`, `admin`, ...).
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_remaining_attacks(mut self, min: i32) -> Self {
        self.min_remaining_attacks = Some(min);
        self
    }

    pub fn message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Builds and inserts the reminder rule entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::reminder_rule::Model)` - Created rule entity
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::reminder_rule::Model, DbErr> {
        let now = Utc::now();
        let (webhook_id, webhook_token) = match self.webhook {
            Some((id, token)) => (Some(id), Some(token)),
            None => (None, None),
        };

        entity::reminder_rule::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(self.guild_id),
            kind: ActiveValue::Set(self.kind),
            clan_tags: ActiveValue::Set(json!(self.clan_tags)),
            lead_times: ActiveValue::Set(json!(self.lead_time_secs)),
            channel_id: ActiveValue::Set(self.channel_id),
            webhook_id: ActiveValue::Set(webhook_id),
            webhook_token: ActiveValue::Set(webhook_token),
            thread_id: ActiveValue::Set(self.thread_id),
            town_hall_min: ActiveValue::Set(self.town_hall_min),
            town_hall_max: ActiveValue::Set(self.town_hall_max),
            linked_only: ActiveValue::Set(self.linked_only),
            roles: ActiveValue::Set(json!(self.roles)),
            min_remaining_attacks: ActiveValue::Set(self.min_remaining_attacks),
            message_template: ActiveValue::Set(self.message_template),
            disabled: ActiveValue::Set(self.disabled),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an enabled war rule for `#2PP` with default values.
///
/// # Arguments
/// - `db` - Database connection
///
/// # Returns
/// - `Ok(entity::reminder_rule::Model)` - Created rule entity
/// - `Err(DbErr)` - Database error during insert
pub async fn create_rule(db: &DatabaseConnection) -> Result<entity::reminder_rule::Model, DbErr> {
    ReminderRuleFactory::new(db).build().await
}
