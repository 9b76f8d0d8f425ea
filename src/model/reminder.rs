//! Reminder rule domain models and parameter types.
//!
//! A reminder rule is authored by the command layer and only read by the engine. It
//! names the clans to watch, the lead times before an event ends at which to remind,
//! who to remind (filters) and where to post (delivery target).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    error::{internal::InternalError, AppError},
    model::clan::ClanRole,
    util::parse::{parse_optional_u64_from_string, parse_u64_from_string},
};

/// Recurring game event a rule reminds about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    War,
    Raid,
    ClanGames,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 3] = [
        ReminderKind::War,
        ReminderKind::Raid,
        ReminderKind::ClanGames,
    ];

    /// Value stored in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::War => "war",
            ReminderKind::Raid => "raid",
            ReminderKind::ClanGames => "clan_games",
        }
    }

    /// Human readable event name used in rendered messages.
    pub fn label(&self) -> &'static str {
        match self {
            ReminderKind::War => "Clan War",
            ReminderKind::Raid => "Raid Weekend",
            ReminderKind::ClanGames => "Clan Games",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "war" => Ok(ReminderKind::War),
            "raid" => Ok(ReminderKind::Raid),
            "clan_games" => Ok(ReminderKind::ClanGames),
            other => Err(InternalError::UnknownReminderKind(other.to_string())),
        }
    }
}

/// Webhook used instead of the bot user to post reminders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub id: u64,
    pub token: String,
}

/// Where a rule's reminders are posted.
///
/// Resolution order is webhook (optionally inside `thread_id`), then `thread_id`,
/// then `channel_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTarget {
    pub channel_id: u64,
    pub webhook: Option<WebhookTarget>,
    pub thread_id: Option<u64>,
}

impl DeliveryTarget {
    pub fn channel(channel_id: u64) -> Self {
        Self {
            channel_id,
            webhook: None,
            thread_id: None,
        }
    }
}

/// Member filters applied when rendering a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleFilters {
    pub town_hall_min: Option<i32>,
    pub town_hall_max: Option<i32>,
    /// Only list members whose player account is linked to a Discord user
    pub linked_only: bool,
    /// Allowed clan roles, empty means every role
    pub roles: Vec<ClanRole>,
    /// Only list members with at least this many attacks left (war and raid)
    pub min_remaining_attacks: Option<i32>,
}

impl RuleFilters {
    /// Checks the town hall and role filters for one member.
    pub fn accepts(&self, town_hall_level: i32, role: ClanRole) -> bool {
        if let Some(min) = self.town_hall_min {
            if town_hall_level < min {
                return false;
            }
        }
        if let Some(max) = self.town_hall_max {
            if town_hall_level > max {
                return false;
            }
        }
        self.roles.is_empty() || self.roles.contains(&role)
    }

    /// Checks the remaining-attacks threshold, defaulting to "at least one".
    pub fn accepts_remaining(&self, remaining: i32) -> bool {
        remaining >= self.min_remaining_attacks.unwrap_or(1).max(1)
    }
}

/// A reminder rule with its stored configuration decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRule {
    pub id: i32,
    pub guild_id: u64,
    pub kind: ReminderKind,
    pub clan_tags: Vec<String>,
    /// Display order, not evaluation order
    pub lead_times: Vec<Duration>,
    pub target: DeliveryTarget,
    pub filters: RuleFilters,
    pub message_template: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReminderRule {
    /// Converts an entity model to a reminder rule.
    ///
    /// # Arguments
    /// - `entity` - The entity model from the database
    ///
    /// # Returns
    /// - `Ok(ReminderRule)` - The decoded rule
    /// - `Err(AppError::Internal)` - Unknown kind, malformed JSON column or unparsable ID
    pub fn from_entity(entity: entity::reminder_rule::Model) -> Result<Self, AppError> {
        let rule_id = entity.id;

        let clan_tags: Vec<String> = decode_column(rule_id, "clan_tags", entity.clan_tags)?;
        let lead_time_secs: Vec<i64> = decode_column(rule_id, "lead_times", entity.lead_times)?;
        let roles: Vec<ClanRole> = decode_column(rule_id, "roles", entity.roles)?;

        let webhook = match (
            parse_optional_u64_from_string(entity.webhook_id)?,
            entity.webhook_token,
        ) {
            (Some(id), Some(token)) => Some(WebhookTarget { id, token }),
            _ => None,
        };

        Ok(Self {
            id: rule_id,
            guild_id: parse_u64_from_string(entity.guild_id)?,
            kind: entity.kind.parse()?,
            clan_tags,
            lead_times: lead_time_secs.into_iter().map(Duration::seconds).collect(),
            target: DeliveryTarget {
                channel_id: parse_u64_from_string(entity.channel_id)?,
                webhook,
                thread_id: parse_optional_u64_from_string(entity.thread_id)?,
            },
            filters: RuleFilters {
                town_hall_min: entity.town_hall_min,
                town_hall_max: entity.town_hall_max,
                linked_only: entity.linked_only,
                roles,
                min_remaining_attacks: entity.min_remaining_attacks,
            },
            message_template: entity.message_template,
            disabled: entity.disabled,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

fn decode_column<T: serde::de::DeserializeOwned>(
    rule_id: i32,
    column: &'static str,
    value: serde_json::Value,
) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|source| {
        InternalError::MalformedRuleColumn {
            rule_id,
            column,
            source,
        }
        .into()
    })
}

/// Parameters for creating a new reminder rule.
#[derive(Debug, Clone)]
pub struct CreateReminderRuleParam {
    pub guild_id: u64,
    pub kind: ReminderKind,
    pub clan_tags: Vec<String>,
    pub lead_times: Vec<Duration>,
    pub target: DeliveryTarget,
    pub filters: RuleFilters,
    pub message_template: String,
    pub disabled: bool,
}

/// Parameters for replacing the editable fields of a reminder rule.
///
/// Guild and kind are fixed at creation.
#[derive(Debug, Clone)]
pub struct UpdateReminderRuleParam {
    pub id: i32,
    pub clan_tags: Vec<String>,
    pub lead_times: Vec<Duration>,
    pub target: DeliveryTarget,
    pub filters: RuleFilters,
    pub message_template: String,
    pub disabled: bool,
}
