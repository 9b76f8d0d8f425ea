//! Event window resolution from live game state.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    model::{clan::RaidState, event::EventInstance, reminder::ReminderKind},
    service::game_data::GameDataClient,
    util::time::clan_games_window,
};

const INSTANCE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

/// Resolves the current event instance of a clan.
///
/// Has no side effects and holds no state, so it is safe to call redundantly and
/// concurrently.
#[derive(Clone)]
pub struct EventWindowResolver {
    game: Arc<dyn GameDataClient>,
}

impl EventWindowResolver {
    pub fn new(game: Arc<dyn GameDataClient>) -> Self {
        Self { game }
    }

    /// Returns the event instance of `kind` the clan is currently in
    ///
    /// Game API failures are logged and treated exactly like "no event", so callers
    /// only ever see `None`.
    ///
    /// # Arguments
    /// - `clan_tag`: Normalized clan tag
    /// - `kind`: Event kind to look up
    /// - `now`: Current time; instances ending at or before it are ignored
    ///
    /// # Returns
    /// - `Some(EventInstance)`: An active instance with its authoritative end time
    /// - `None`: No active instance, or the game API could not be reached
    pub async fn resolve(
        &self,
        clan_tag: &str,
        kind: ReminderKind,
        now: DateTime<Utc>,
    ) -> Option<EventInstance> {
        let instance = match kind {
            ReminderKind::War => self.resolve_war(clan_tag).await,
            ReminderKind::Raid => self.resolve_raid(clan_tag).await,
            ReminderKind::ClanGames => {
                clan_games_window(now).map(|(start_time, end_time)| EventInstance {
                    clan_tag: clan_tag.to_string(),
                    kind,
                    instance_key: format!("games:{}", start_time.format("%Y-%m")),
                    start_time,
                    end_time,
                })
            }
        }?;

        (instance.end_time > now).then_some(instance)
    }

    async fn resolve_war(&self, clan_tag: &str) -> Option<EventInstance> {
        let war = match self.game.current_war(clan_tag).await {
            Ok(war) => war?,
            Err(e) => {
                tracing::warn!("Failed to resolve war for clan {}: {}", clan_tag, e);
                return None;
            }
        };

        if !war.state.is_active() {
            return None;
        }

        Some(EventInstance {
            clan_tag: clan_tag.to_string(),
            kind: ReminderKind::War,
            instance_key: format!(
                "war:{}",
                war.preparation_start_time.format(INSTANCE_TIME_FORMAT)
            ),
            start_time: war.start_time,
            end_time: war.end_time,
        })
    }

    async fn resolve_raid(&self, clan_tag: &str) -> Option<EventInstance> {
        let season = match self.game.current_raid_season(clan_tag).await {
            Ok(season) => season?,
            Err(e) => {
                tracing::warn!("Failed to resolve raid weekend for clan {}: {}", clan_tag, e);
                return None;
            }
        };

        if season.state != RaidState::Ongoing {
            return None;
        }

        Some(EventInstance {
            clan_tag: clan_tag.to_string(),
            kind: ReminderKind::Raid,
            instance_key: format!("raid:{}", season.start_time.format(INSTANCE_TIME_FORMAT)),
            start_time: season.start_time,
            end_time: season.end_time,
        })
    }
}
