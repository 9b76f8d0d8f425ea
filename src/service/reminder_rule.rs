//! Validated rule management for the command layer.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::{
    data::{reminder_rule::ReminderRuleRepository, rule_health::RuleHealthRepository},
    error::AppError,
    model::{
        health::RuleHealth,
        reminder::{
            CreateReminderRuleParam, ReminderRule, RuleFilters, UpdateReminderRuleParam,
        },
    },
    service::materializer::TriggerMaterializer,
    util::tag::{is_valid_tag, normalize_tag},
};

/// Longest lead time a rule may use.
const MAX_LEAD_TIME_DAYS: i64 = 7;
/// Most clans a single rule may watch.
const MAX_CLANS_PER_RULE: usize = 25;

pub struct ReminderRuleService<'a> {
    db: &'a DatabaseConnection,
    materializer: &'a TriggerMaterializer,
}

impl<'a> ReminderRuleService<'a> {
    pub fn new(db: &'a DatabaseConnection, materializer: &'a TriggerMaterializer) -> Self {
        Self { db, materializer }
    }

    /// Creates a rule after validating and normalizing it
    ///
    /// Events already running for the rule's clans get their records right away
    /// instead of waiting for the next materialization pass.
    ///
    /// # Returns
    /// - `Ok(ReminderRule)`: The stored rule
    /// - `Err(AppError::BadRequest)`: Invalid lead times, clan tags or filters
    pub async fn create(&self, mut param: CreateReminderRuleParam) -> Result<ReminderRule, AppError> {
        param.clan_tags = normalize_clan_tags(&param.clan_tags)?;
        validate_lead_times(&param.lead_times, param.disabled)?;
        validate_filters(&param.filters)?;

        let rule = ReminderRuleRepository::new(self.db).create(param).await?;

        tracing::info!(
            "Created {} reminder rule {} for guild {}",
            rule.kind,
            rule.id,
            rule.guild_id
        );

        self.materialize_now(&rule).await;

        Ok(rule)
    }

    /// Replaces a rule's editable fields
    ///
    /// Records already materialized for running events keep their original lead
    /// times; the new configuration applies from the next event. Running events
    /// the rule has no records for yet, e.g. after re-enabling it, get them right
    /// away.
    ///
    /// # Returns
    /// - `Ok(ReminderRule)`: The updated rule
    /// - `Err(AppError::NotFound)`: No rule with that ID
    /// - `Err(AppError::BadRequest)`: Invalid lead times, clan tags or filters
    pub async fn update(&self, mut param: UpdateReminderRuleParam) -> Result<ReminderRule, AppError> {
        param.clan_tags = normalize_clan_tags(&param.clan_tags)?;
        validate_lead_times(&param.lead_times, param.disabled)?;
        validate_filters(&param.filters)?;

        let id = param.id;
        let rule = ReminderRuleRepository::new(self.db)
            .update(param)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reminder rule {} not found", id)))?;

        // A changed target may fix a broken one; let the next delivery decide
        RuleHealthRepository::new(self.db).clear(rule.id).await?;

        self.materialize_now(&rule).await;

        Ok(rule)
    }

    /// Deletes a rule
    ///
    /// Its scheduler records stay as delivery history; the dispatcher drops any
    /// still pending.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let deleted = ReminderRuleRepository::new(self.db).delete(id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("Reminder rule {} not found", id)));
        }
        Ok(())
    }

    /// Lists a guild's rules with their delivery health
    pub async fn list_by_guild(
        &self,
        guild_id: u64,
    ) -> Result<Vec<(ReminderRule, Option<RuleHealth>)>, AppError> {
        let rules = ReminderRuleRepository::new(self.db)
            .get_by_guild(guild_id)
            .await?;
        let health_repo = RuleHealthRepository::new(self.db);

        let mut result = Vec::with_capacity(rules.len());
        for rule in rules {
            let health = health_repo.find_by_rule(rule.id).await?;
            result.push((rule, health));
        }

        Ok(result)
    }

    /// Materializes the running events of an enabled rule's clans.
    ///
    /// Failures are logged; the periodic pass picks the rule up later.
    async fn materialize_now(&self, rule: &ReminderRule) {
        if rule.disabled {
            return;
        }

        for clan_tag in &rule.clan_tags {
            if let Err(e) = self
                .materializer
                .materialize_clan(clan_tag, rule.kind, Utc::now())
                .await
            {
                tracing::error!(
                    "Failed to materialize rule {} for clan {}: {}",
                    rule.id,
                    clan_tag,
                    e
                );
            }
        }
    }
}

/// Normalizes, validates and de-duplicates clan tags, keeping first-seen order.
fn normalize_clan_tags(tags: &[String]) -> Result<Vec<String>, AppError> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = normalize_tag(tag);
        if !is_valid_tag(&tag) {
            return Err(AppError::BadRequest(format!("Invalid clan tag '{}'", tag)));
        }
        if !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }

    if normalized.is_empty() {
        return Err(AppError::BadRequest(
            "A reminder rule needs at least one clan".to_string(),
        ));
    }
    if normalized.len() > MAX_CLANS_PER_RULE {
        return Err(AppError::BadRequest(format!(
            "A reminder rule can watch at most {} clans",
            MAX_CLANS_PER_RULE
        )));
    }

    Ok(normalized)
}

fn validate_lead_times(lead_times: &[Duration], disabled: bool) -> Result<(), AppError> {
    if lead_times.is_empty() && !disabled {
        return Err(AppError::BadRequest(
            "An enabled reminder rule needs at least one lead time".to_string(),
        ));
    }

    for lead in lead_times {
        if *lead <= Duration::zero() {
            return Err(AppError::BadRequest(
                "Lead times must be greater than zero".to_string(),
            ));
        }
        if lead.num_seconds() % 60 != 0 {
            return Err(AppError::BadRequest(
                "Lead times must be whole minutes".to_string(),
            ));
        }
        if *lead > Duration::days(MAX_LEAD_TIME_DAYS) {
            return Err(AppError::BadRequest(format!(
                "Lead times cannot exceed {} days",
                MAX_LEAD_TIME_DAYS
            )));
        }
    }

    Ok(())
}

fn validate_filters(filters: &RuleFilters) -> Result<(), AppError> {
    if let (Some(min), Some(max)) = (filters.town_hall_min, filters.town_hall_max) {
        if min > max {
            return Err(AppError::BadRequest(format!(
                "Town hall minimum {} is above maximum {}",
                min, max
            )));
        }
    }
    if filters.min_remaining_attacks.is_some_and(|min| min < 1) {
        return Err(AppError::BadRequest(
            "Minimum remaining attacks must be at least 1".to_string(),
        ));
    }
    Ok(())
}
