use sea_orm::DatabaseConnection;
use serenity::all::{Context, Guild, UnavailableGuild};

use crate::{
    data::{reminder_rule::ReminderRuleRepository, rule_health::RuleHealthRepository},
    error::AppError,
    model::health::HealthStatus,
};

/// Handles the guild_delete event.
///
/// Fires both when the bot is removed from a guild and when a guild goes
/// unavailable during a Discord outage. Only removal breaks the guild's rules.
pub async fn handle_guild_delete(
    db: &DatabaseConnection,
    _ctx: Context,
    incomplete: UnavailableGuild,
    _full: Option<Guild>,
) {
    let guild_id = incomplete.id.get();

    if incomplete.unavailable {
        tracing::warn!("Guild {} became unavailable", guild_id);
        return;
    }

    match mark_guild_rules_broken(db, guild_id).await {
        Ok(count) => tracing::info!(
            "Removed from guild {}, marked {} reminder rules broken",
            guild_id,
            count
        ),
        Err(e) => tracing::error!(
            "Failed to mark reminder rules for guild {}: {:?}",
            guild_id,
            e
        ),
    }
}

/// Marks every rule of a guild the bot was removed from as broken
pub async fn mark_guild_rules_broken(
    db: &DatabaseConnection,
    guild_id: u64,
) -> Result<usize, AppError> {
    let rules = ReminderRuleRepository::new(db).get_by_guild(guild_id).await?;
    let health_repo = RuleHealthRepository::new(db);

    for rule in &rules {
        health_repo
            .record_failure(rule.id, HealthStatus::Broken, "Bot was removed from the guild")
            .await?;
    }

    Ok(rules.len())
}
