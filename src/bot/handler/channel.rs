//! Channel and thread deletion handlers.
//!
//! A reminder posted to a deleted channel or thread can never succeed, so every rule
//! targeting it is marked broken right away instead of waiting for the next delivery
//! to fail.

use sea_orm::DatabaseConnection;
use serenity::all::{Context, GuildChannel, Message, PartialGuildChannel};

use crate::{
    data::{reminder_rule::ReminderRuleRepository, rule_health::RuleHealthRepository},
    error::AppError,
    model::health::HealthStatus,
};

/// Handles the channel_delete event when a channel is deleted from a guild.
pub async fn handle_channel_delete(
    db: &DatabaseConnection,
    _ctx: Context,
    channel: GuildChannel,
    _messages: Option<Vec<Message>>,
) {
    let guild_id = channel.guild_id.get();
    let channel_id = channel.id.get();

    match mark_channel_rules_broken(db, channel_id, "Channel was deleted").await {
        Ok(0) => {}
        Ok(count) => tracing::info!(
            "Marked {} reminder rules broken after channel {} was deleted from guild {}",
            count,
            channel_id,
            guild_id
        ),
        Err(e) => tracing::error!(
            "Failed to mark reminder rules for deleted channel {} in guild {}: {:?}",
            channel_id,
            guild_id,
            e
        ),
    }
}

/// Handles the thread_delete event.
pub async fn handle_thread_delete(
    db: &DatabaseConnection,
    _ctx: Context,
    thread: PartialGuildChannel,
    _full_thread_data: Option<GuildChannel>,
) {
    let thread_id = thread.id.get();

    match mark_channel_rules_broken(db, thread_id, "Thread was deleted").await {
        Ok(0) => {}
        Ok(count) => tracing::info!(
            "Marked {} reminder rules broken after thread {} was deleted",
            count,
            thread_id
        ),
        Err(e) => tracing::error!(
            "Failed to mark reminder rules for deleted thread {}: {:?}",
            thread_id,
            e
        ),
    }
}

/// Marks every rule posting to a channel or thread as broken
///
/// # Returns
/// - `Ok(usize)`: Number of rules marked
/// - `Err(AppError)`: Database error
pub async fn mark_channel_rules_broken(
    db: &DatabaseConnection,
    channel_id: u64,
    reason: &str,
) -> Result<usize, AppError> {
    let rules = ReminderRuleRepository::new(db)
        .get_by_channel(channel_id)
        .await?;
    let health_repo = RuleHealthRepository::new(db);

    for rule in &rules {
        health_repo
            .record_failure(rule.id, HealthStatus::Broken, reason)
            .await?;
    }

    Ok(rules.len())
}
