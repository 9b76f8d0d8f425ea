//! Discord bot integration.
//!
//! The bot's HTTP client is shared with the delivery sink so reminders are posted
//! without a second connection to Discord. The gateway handler only watches for
//! channels, threads and guilds disappearing, and marks the reminder rules that
//! targeted them as broken so the dispatcher stops trying to deliver there.
//!
//! # Gateway Intents
//!
//! - `GUILDS` - Receive channel, thread and guild deletion events

pub mod handler;
pub mod start;
