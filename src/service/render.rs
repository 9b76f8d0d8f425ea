//! Reminder message rendering from live clan data.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::{collections::HashMap, sync::Arc};

use crate::{
    data::player_link::PlayerLinkRepository,
    error::AppError,
    model::{
        clan::{Clan, ClanRole, RaidState},
        reminder::{ReminderKind, ReminderRule},
        scheduler::SchedulerRecord,
    },
    service::game_data::GameDataClient,
    util::time::{discord_full, discord_relative, format_duration},
};

/// Attacks available to a member who has not raided yet this weekend.
const RAID_ATTACKS_PER_MEMBER: i32 = 6;

/// Template used when a rule has no message of its own.
pub const DEFAULT_TEMPLATE: &str = "**{clan}** {kind} ends {end_time}";

/// One member still expected to act.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingMember {
    tag: String,
    name: String,
    /// Attacks left; `None` for events without an attack count
    remaining: Option<i32>,
}

/// Renders reminder messages for claimed scheduler records.
#[derive(Clone)]
pub struct ReminderRenderer {
    db: DatabaseConnection,
    game: Arc<dyn GameDataClient>,
}

impl ReminderRenderer {
    pub fn new(db: DatabaseConnection, game: Arc<dyn GameDataClient>) -> Self {
        Self { db, game }
    }

    /// Renders the reminder for a record
    ///
    /// Fills the rule's template and appends the members still to act after the
    /// rule's filters are applied.
    ///
    /// # Returns
    /// - `Ok(Some(String))`: Message to deliver
    /// - `Ok(None)`: Nothing to remind; no member is left or the event is over
    /// - `Err(AppError)`: Live data or player links could not be loaded
    pub async fn render(
        &self,
        rule: &ReminderRule,
        record: &SchedulerRecord,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AppError> {
        let Some((clan_name, members)) = self.pending_members(rule, record).await? else {
            tracing::debug!(
                "Event {} of clan {} is no longer running",
                record.instance_key,
                record.clan_tag
            );
            return Ok(None);
        };

        let tags: Vec<String> = members.iter().map(|m| m.tag.clone()).collect();
        let links = PlayerLinkRepository::new(&self.db)
            .get_user_ids_by_player_tags(&tags)
            .await?;

        let members: Vec<PendingMember> = members
            .into_iter()
            .filter(|m| !rule.filters.linked_only || links.contains_key(&m.tag))
            .collect();

        if members.is_empty() {
            return Ok(None);
        }

        let template = if rule.message_template.trim().is_empty() {
            DEFAULT_TEMPLATE
        } else {
            rule.message_template.as_str()
        };

        let header = fill_template(template, &clan_name, record, now);
        let list = member_list(&members, &links);

        Ok(Some(format!("{}\n\n{}", header, list)))
    }

    /// Loads the live roster of the record's event and applies the rule filters
    ///
    /// Returns `None` when the event the record was created for is no longer live.
    async fn pending_members(
        &self,
        rule: &ReminderRule,
        record: &SchedulerRecord,
    ) -> Result<Option<(String, Vec<PendingMember>)>, AppError> {
        let filters = &rule.filters;

        match record.kind {
            ReminderKind::War => {
                let Some(war) = self.game.current_war(&record.clan_tag).await? else {
                    return Ok(None);
                };
                if !war.state.is_active() || war.end_time != record.end_time {
                    return Ok(None);
                }

                // War rosters carry no roles; only fetch the clan when a role filter needs it
                let roles = if filters.roles.is_empty() {
                    HashMap::new()
                } else {
                    self.clan_roles(&record.clan_tag).await?
                };

                let members = war
                    .members
                    .into_iter()
                    .filter_map(|m| {
                        let role = roles.get(&m.tag).copied().unwrap_or(ClanRole::Unknown);
                        let remaining = (war.attacks_per_member - m.attacks_used).max(0);
                        (filters.accepts(m.town_hall_level, role)
                            && filters.accepts_remaining(remaining))
                        .then_some(PendingMember {
                            tag: m.tag,
                            name: m.name,
                            remaining: Some(remaining),
                        })
                    })
                    .collect();

                Ok(Some((war.clan_name, members)))
            }
            ReminderKind::Raid => {
                let Some(season) = self.game.current_raid_season(&record.clan_tag).await? else {
                    return Ok(None);
                };
                if season.state != RaidState::Ongoing || season.end_time != record.end_time {
                    return Ok(None);
                }
                let Some(clan) = self.game.clan(&record.clan_tag).await? else {
                    return Ok(None);
                };

                let raided: HashMap<&str, i32> = season
                    .members
                    .iter()
                    .map(|m| (m.tag.as_str(), m.remaining_attacks()))
                    .collect();

                let members = clan
                    .members
                    .iter()
                    .filter_map(|m| {
                        let remaining = raided
                            .get(m.tag.as_str())
                            .copied()
                            .unwrap_or(RAID_ATTACKS_PER_MEMBER);
                        (filters.accepts(m.town_hall_level, m.role)
                            && filters.accepts_remaining(remaining))
                        .then(|| PendingMember {
                            tag: m.tag.clone(),
                            name: m.name.clone(),
                            remaining: Some(remaining),
                        })
                    })
                    .collect();

                Ok(Some((clan.name, members)))
            }
            ReminderKind::ClanGames => {
                let Some(clan) = self.game.clan(&record.clan_tag).await? else {
                    return Ok(None);
                };

                let members = clan
                    .members
                    .iter()
                    .filter(|m| filters.accepts(m.town_hall_level, m.role))
                    .map(|m| PendingMember {
                        tag: m.tag.clone(),
                        name: m.name.clone(),
                        remaining: None,
                    })
                    .collect();

                Ok(Some((clan.name, members)))
            }
        }
    }

    async fn clan_roles(&self, clan_tag: &str) -> Result<HashMap<String, ClanRole>, AppError> {
        Ok(self
            .game
            .clan(clan_tag)
            .await?
            .map(|clan: Clan| {
                clan.members
                    .into_iter()
                    .map(|m| (m.tag, m.role))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Replaces the supported placeholders in a message template.
///
/// Supported: `{clan}`, `{clan_tag}`, `{kind}`, `{remaining}`, `{end_time}`,
/// `{end_time_full}`. Unknown placeholders are left as written.
fn fill_template(
    template: &str,
    clan_name: &str,
    record: &SchedulerRecord,
    now: DateTime<Utc>,
) -> String {
    template
        .replace("{clan}", clan_name)
        .replace("{clan_tag}", &record.clan_tag)
        .replace("{kind}", record.kind.label())
        .replace("{remaining}", &format_duration(record.end_time - now))
        .replace("{end_time_full}", &discord_full(record.end_time))
        .replace("{end_time}", &discord_relative(record.end_time))
}

/// One line per member, mentioning linked users and naming the rest.
fn member_list(members: &[PendingMember], links: &HashMap<String, u64>) -> String {
    members
        .iter()
        .map(|m| {
            let who = match links.get(&m.tag) {
                Some(user_id) => format!("<@{}> {}", user_id, m.name),
                None => m.name.clone(),
            };
            match m.remaining {
                Some(remaining) => format!("• {} ({} left)", who, remaining),
                None => format!("• {}", who),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
