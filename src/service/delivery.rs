//! Messaging collaborator used to post rendered reminders.

use async_trait::async_trait;
use serenity::{
    all::{ChannelId, CreateAllowedMentions, CreateMessage, ExecuteWebhook, Webhook, WebhookId},
    http::{Http, HttpError},
};
use std::sync::Arc;

use crate::{error::delivery::DeliveryError, model::reminder::DeliveryTarget};

/// Discord's message content limit in characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Posts one message to a rule's delivery target.
///
/// Content longer than [`MESSAGE_LIMIT`] is split by the caller with
/// [`split_message`] and posted part by part, so a failed part can be resumed
/// without re-posting the ones before it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Posts `content` to `target`.
    ///
    /// # Returns
    /// - `Ok(())`: The message was posted
    /// - `Err(DeliveryError::Retryable)`: Rate limit, transport error or 5xx
    /// - `Err(DeliveryError::Terminal)`: Target gone, permission revoked or request rejected
    async fn deliver(&self, target: &DeliveryTarget, content: &str) -> Result<(), DeliveryError>;
}

/// Delivery through the bot's Discord HTTP client.
pub struct DiscordDeliverySink {
    http: Arc<Http>,
}

impl DiscordDeliverySink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DeliverySink for DiscordDeliverySink {
    async fn deliver(&self, target: &DeliveryTarget, content: &str) -> Result<(), DeliveryError> {
        match &target.webhook {
            Some(webhook) => {
                let webhook =
                    Webhook::from_id_with_token(&self.http, WebhookId::new(webhook.id), &webhook.token)
                        .await
                        .map_err(classify)?;

                let mut builder = ExecuteWebhook::new()
                    .content(content)
                    .allowed_mentions(user_mentions_only());
                if let Some(thread_id) = target.thread_id {
                    builder = builder.in_thread(ChannelId::new(thread_id));
                }

                webhook
                    .execute(&self.http, false, builder)
                    .await
                    .map_err(classify)?;
            }
            None => {
                let message = CreateMessage::new()
                    .content(content)
                    .allowed_mentions(user_mentions_only());

                ChannelId::new(target.thread_id.unwrap_or(target.channel_id))
                    .send_message(&self.http, message)
                    .await
                    .map_err(classify)?;
            }
        }

        Ok(())
    }
}

fn user_mentions_only() -> CreateAllowedMentions {
    CreateAllowedMentions::new()
        .all_users(true)
        .all_roles(false)
        .everyone(false)
}

/// Maps a Serenity error onto the retryable/terminal split.
///
/// Transport failures and rate limits are retryable; API statuses are classified by
/// [`DeliveryError::from_status`]; anything else (e.g. a builder rejecting the
/// message) can never succeed and is terminal.
pub fn classify(err: serenity::Error) -> DeliveryError {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            DeliveryError::from_status(response.status_code.as_u16(), response.error.message)
        }
        serenity::Error::Http(HttpError::Request(e)) => DeliveryError::Retryable(e.to_string()),
        serenity::Error::Http(e @ HttpError::RateLimitI64F64)
        | serenity::Error::Http(e @ HttpError::RateLimitUtf8) => {
            DeliveryError::Retryable(e.to_string())
        }
        serenity::Error::Io(e) => DeliveryError::Retryable(e.to_string()),
        other => DeliveryError::Terminal(other.to_string()),
    }
}

/// Splits a message into parts of at most `limit` characters.
///
/// Breaks on line boundaries; a single line longer than `limit` is cut at the
/// character limit.
pub fn split_message(content: &str, limit: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in content.split('\n') {
        let mut line = line.to_string();
        let mut line_len = line.chars().count();

        while line_len > limit {
            if current_len > 0 {
                parts.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let head: String = line.chars().take(limit).collect();
            line = line.chars().skip(limit).collect();
            line_len -= limit;
            parts.push(head);
        }

        let needed = if current_len == 0 { line_len } else { line_len + 1 };
        if current_len > 0 && current_len + needed > limit {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(&line);
        current_len += line_len;
    }

    if !current.trim().is_empty() {
        parts.push(current);
    }

    parts
}
